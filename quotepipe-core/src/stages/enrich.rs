//! Indicator engine: per-security, time-ordered derived columns.
//!
//! This is a whole-group temporal computation — each row depends on earlier
//! rows of the same security and never on later ones. Under the distributed
//! backend the stage therefore starts with the synchronization barrier,
//! computes on the coordinator, and redistributes into fresh partitions for
//! downstream stages. The local backend computes directly in place.

use crate::backend::ExecutionBackend;
use crate::data::convert::{enriched_to_frame, frame_to_trades};
use crate::data::ingest::DataError;
use crate::domain::{EnrichedRecord, TradeRecord};
use crate::indicators::{percent_change, rolling_mean, rolling_std};
use crate::table::WorkingTable;

const MA_SHORT_WINDOW: usize = 7;
const MA_LONG_WINDOW: usize = 30;
const VOLATILITY_WINDOW: usize = 7;

/// Compute the five derived columns for every security group.
pub fn enrich(
    table: WorkingTable,
    backend: &dyn ExecutionBackend,
) -> Result<WorkingTable, DataError> {
    let gathered = backend.materialize(&table)?;
    let trades = frame_to_trades(&gathered)?;
    let enriched = compute_indicators(&trades);
    tracing::info!(rows = enriched.len(), "computed indicator columns");
    let out = enriched_to_frame(&enriched)?;
    Ok(backend.distribute(out))
}

/// Enrich records already in canonical `(SECID, TRADEDATE)` order.
///
/// Groups are the maximal consecutive runs of one security; each group is
/// computed independently so no indicator ever crosses a security boundary.
pub fn compute_indicators(trades: &[TradeRecord]) -> Vec<EnrichedRecord> {
    let mut enriched = Vec::with_capacity(trades.len());
    let mut start = 0;
    while start < trades.len() {
        let secid = &trades[start].secid;
        let end = trades[start..]
            .iter()
            .position(|t| &t.secid != secid)
            .map(|offset| start + offset)
            .unwrap_or(trades.len());
        enrich_group(&trades[start..end], &mut enriched);
        start = end;
    }
    enriched
}

fn enrich_group(group: &[TradeRecord], out: &mut Vec<EnrichedRecord>) {
    let closes: Vec<f64> = group.iter().map(|t| t.close).collect();
    let volumes: Vec<f64> = group.iter().map(|t| t.volume).collect();

    let daily_return = percent_change(&closes);
    let ma_7 = rolling_mean(&closes, MA_SHORT_WINDOW);
    let ma_30 = rolling_mean(&closes, MA_LONG_WINDOW);
    let volatility_7 = rolling_std(&daily_return, VOLATILITY_WINDOW);
    let volume_change = percent_change(&volumes);

    for (i, trade) in group.iter().enumerate() {
        out.push(EnrichedRecord {
            secid: trade.secid.clone(),
            tradedate: trade.tradedate,
            open: trade.open,
            high: trade.high,
            low: trade.low,
            close: trade.close,
            volume: trade.volume,
            daily_return: daily_return[i],
            ma_7: ma_7[i],
            ma_30: ma_30[i],
            volatility_7: volatility_7[i],
            volume_change: volume_change[i],
        });
    }
}
