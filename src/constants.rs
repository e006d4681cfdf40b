pub mod cache {

    pub const SEARCH_TTL_MINUTES: i64 = 59;

    pub const DETAIL_TTL_MINUTES: i64 = 59;
}

pub mod limits {

    pub const MAX_CLI_RESULTS: usize = 10;
}
