/// HTTP clients for the upstream data sources.
///
/// Each submodule wraps one third-party API: typed response structures,
/// URL construction, and parsing split out from fetching so the parsers
/// can be tested against canned bodies.

pub mod openaq;
pub mod openmeteo;
