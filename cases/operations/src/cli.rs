use crate::{
    crate_version, parse_count, App, AppSettings, Arg, ArgMatches, WorkloadError, DEFAULT_COUNT,
};

pub fn app() -> App<'static, 'static> {
    App::new("operations_workload")
        .version(crate_version!())
        // lets `-5` reach `parse_count` instead of failing as an unknown flag
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(
            Arg::with_name("count")
                .index(1)
                .required(false)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .short("s")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ordering")
                .long("ordering")
                .takes_value(true)
                .possible_values(&["shuffled", "inserts-first"]),
        )
        .arg(
            Arg::with_name("window")
                .long("window")
                .short("w")
                .takes_value(true),
        )
}

/// The insert count from the command line, or `DEFAULT_COUNT` when omitted.
pub fn count_arg(matches: &ArgMatches) -> Result<u32, WorkloadError> {
    matches
        .value_of("count")
        .map_or(Ok(DEFAULT_COUNT), parse_count)
}
