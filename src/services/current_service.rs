use tracing::warn;

use crate::api::{PriceSource, RateSource};
use crate::db::SnapshotStore;
use crate::models::{CurrencyReading, CurrentData};
use crate::utils::errors::FetchError;

/// Live rates and bitcoin price, each compared against the most recent stored snapshot.
///
/// Both providers must answer; a store failure only drops the comparison.
pub async fn get_current_data(
    rate_source: &dyn RateSource,
    price_source: &dyn PriceSource,
    store: &SnapshotStore,
) -> Result<CurrentData, FetchError> {
    let (rates, price) = tokio::join!(rate_source.fetch_rates(), price_source.fetch_bitcoin_price());
    let rates = rates?;
    let bitcoin_price = price?;

    let previous = match store.latest().await {
        Ok(previous) => previous,
        Err(e) => {
            warn!("Could not load previous snapshot for comparison: {}", e);
            None
        }
    };

    Ok(CurrentData {
        cad: CurrencyReading::for_currency("CAD", rates.cad, previous.as_ref().map(|p| p.rate_cad)),
        mxn: CurrencyReading::for_currency("MXN", rates.mxn, previous.as_ref().map(|p| p.rate_mxn)),
        cny: CurrencyReading::for_currency("CNY", rates.cny, previous.as_ref().map(|p| p.rate_cny)),
        jpy: CurrencyReading::for_currency("JPY", rates.jpy, previous.as_ref().map(|p| p.rate_jpy)),
        bitcoin: CurrencyReading::new(bitcoin_price, previous.as_ref().map(|p| p.bitcoin_price)),
    })
}
