//! Hedera-side client: mirror-node polling, memo parsing, and scheduled
//! transaction submission for burns and fee distribution.

pub mod memo;
pub mod mirror;
pub mod schedule;

pub use memo::parse_memo;
pub use mirror::{HbarTransfer, IncomingTransfer, MirrorClient, MirrorTransaction, NftTransfer, TokenTransfer};
pub use schedule::{HieroScheduleClient, ScheduleClient, ScheduleOutcome};
