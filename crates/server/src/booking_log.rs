use tidyquote_core::{BookingId, BookingRecord};
use tokio::sync::RwLock;

/// In-memory list of booked quotes. Not a durable store: entries live for
/// the process lifetime only. The pricing engine never touches this.
#[derive(Default)]
pub struct BookingLog {
    entries: RwLock<Vec<BookingRecord>>,
}

impl BookingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, record: BookingRecord) -> BookingId {
        let id = record.id.clone();
        self.entries.write().await.push(record);
        id
    }

    pub async fn list(&self) -> Vec<BookingRecord> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tidyquote_core::{
        AccessFlags, BookingRecord, BreakdownLine, Cadence, CustomerDetails, QuoteRequest,
        QuoteResult, Service,
    };

    use super::BookingLog;

    fn record() -> BookingRecord {
        BookingRecord::new(
            CustomerDetails {
                name: "Alex".to_string(),
                email: "alex@example.com".to_string(),
                postcode: None,
            },
            QuoteRequest {
                service: Service::General { cadence: Cadence::OneOff },
                flags: AccessFlags::default(),
                promo: None,
                addons: Vec::new(),
            },
            QuoteResult {
                total: Decimal::new(5000, 2),
                breakdown: vec![BreakdownLine::new(
                    "General clean (one-off)",
                    Decimal::new(5000, 2),
                )],
            },
        )
    }

    #[tokio::test]
    async fn records_are_listed_in_insertion_order() {
        let log = BookingLog::new();
        let first = log.record(record()).await;
        let second = log.record(record()).await;

        let entries = log.list().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, first);
        assert_eq!(entries[1].id, second);
        assert_eq!(log.len().await, 2);
    }
}
