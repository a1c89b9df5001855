pub mod case;
pub mod client;
pub mod contract;
pub mod lawyer;
pub mod payment;
pub mod work;

pub use case::Case;
pub use client::Client;
pub use contract::Contract;
pub use lawyer::Lawyer;
pub use payment::Payment;
pub use work::Work;

/// "Last, First Middle" with missing parts dropped
pub(crate) fn display_name(last: Option<&str>, first: Option<&str>, middle: Option<&str>) -> String {
    let last = last.unwrap_or("").trim();
    let given = [first, middle]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    match (last.is_empty(), given.is_empty()) {
        (true, true) => String::new(),
        (false, true) => last.to_string(),
        (true, false) => given,
        (false, false) => format!("{}, {}", last, given),
    }
}
