//! # Property Availability Coordination
//!
//! Pure mapping from deal state to property availability. Applied as part
//! of the same logical operation as the deal mutation that triggered it;
//! never invoked independently of a deal-state change.
//!
//! The deal's status is the source of truth; property status is a derived
//! projection recoverable by re-running this mapping.

use crate::domain::entities::DealStatus;
use shared_types::PropertyStatus;

/// Property status implied by the status of its linked deal.
///
/// `Completed → Rented`, active `Pending → Pending`,
/// `Cancelled → Available`.
pub fn property_status_for(deal_status: DealStatus) -> PropertyStatus {
    match deal_status {
        DealStatus::Pending => PropertyStatus::Pending,
        DealStatus::Completed => PropertyStatus::Rented,
        DealStatus::Cancelled => PropertyStatus::Available,
    }
}
