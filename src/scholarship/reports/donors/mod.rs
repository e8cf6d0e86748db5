//! Donor ledger and the analytics derived from it.

pub mod cohort;
pub mod donor;
pub mod ledger;
pub mod major;
pub mod retention;

pub use cohort::{Cohort, CohortSummary, FiscalYearCohorts, classify};
pub use donor::{Address, Donor};
pub use ledger::{DonorLedger, IngestSummary};
pub use major::{MajorDonorSummary, MajorDonorYear, major_donors};
pub use retention::{RetentionSummary, RetentionYear, mailing_list, non_repeat_donors};
