use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid {field} date on trade {trade_id}: could not parse '{raw}'")]
    InvalidDate {
        trade_id: String,
        field: &'static str,
        raw: String,
    },

    #[error("Trade {0} has a non-finite P&L amount")]
    NonFinitePnl(String),
}
