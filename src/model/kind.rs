use serde::{Deserialize, Serialize};

/// Whether money came in or went out. Shared by categories and transactions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum Kind {
    Income,
    #[default]
    Expense,
}

// Serialized as `Income` / `Expense`, which is also the text stored in the database.
serde_plain::derive_display_from_serialize!(Kind);
serde_plain::derive_fromstr_from_deserialize!(Kind);
