/// Referential-integrity policy table
///
/// Every foreign key in the schema is listed here with its ON DELETE policy.
/// The migration declares each constraint by the same name, so the database
/// enforces exactly this table. The API layer uses it to turn a constraint
/// violation into a readable message.
///
/// ```text
/// users ──< listings (owner, CASCADE)      categories ──< listings (RESTRICT)
/// users ──< listings (winner, SET NULL)    bids ──< listings.current_bid (SET NULL)
/// users ──< bids / comments / watchlist (CASCADE)
/// listings ──< bids / comments / watchlist (CASCADE)
/// ```

use serde::Serialize;

/// What happens to referencing rows when the referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
    /// Referencing rows are deleted too
    Cascade,

    /// Deletion is refused while referencing rows exist
    Restrict,

    /// The referencing column is set to NULL
    SetNull,
}

impl OnDelete {
    /// SQL spelling used in the migration
    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
            OnDelete::SetNull => "SET NULL",
        }
    }
}

/// One foreign-key relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// Constraint name as declared in the migration
    pub constraint: &'static str,

    /// Referencing table
    pub table: &'static str,

    /// Referencing column
    pub column: &'static str,

    /// Referenced table (always keyed by `id`)
    pub references: &'static str,

    /// Delete policy
    pub on_delete: OnDelete,
}

impl Relation {
    /// Message shown when deleting a referenced row violates this relation
    pub fn violation_message(&self) -> String {
        match self.on_delete {
            OnDelete::Restrict => format!(
                "Cannot delete this {}: it is still referenced by {}.",
                singular(self.references),
                self.table
            ),
            _ => format!("The referenced {} does not exist.", singular(self.references)),
        }
    }
}

/// The policy for every relation in the schema
pub const RELATIONS: &[Relation] = &[
    Relation {
        constraint: "listings_owner_fk",
        table: "listings",
        column: "owner_id",
        references: "users",
        on_delete: OnDelete::Cascade,
    },
    Relation {
        constraint: "listings_category_fk",
        table: "listings",
        column: "category_id",
        references: "categories",
        on_delete: OnDelete::Restrict,
    },
    Relation {
        constraint: "listings_winner_fk",
        table: "listings",
        column: "winner_id",
        references: "users",
        on_delete: OnDelete::SetNull,
    },
    Relation {
        constraint: "listings_current_bid_fk",
        table: "listings",
        column: "current_bid_id",
        references: "bids",
        on_delete: OnDelete::SetNull,
    },
    Relation {
        constraint: "bids_user_fk",
        table: "bids",
        column: "user_id",
        references: "users",
        on_delete: OnDelete::Cascade,
    },
    Relation {
        constraint: "bids_listing_fk",
        table: "bids",
        column: "listing_id",
        references: "listings",
        on_delete: OnDelete::Cascade,
    },
    Relation {
        constraint: "comments_user_fk",
        table: "comments",
        column: "user_id",
        references: "users",
        on_delete: OnDelete::Cascade,
    },
    Relation {
        constraint: "comments_listing_fk",
        table: "comments",
        column: "listing_id",
        references: "listings",
        on_delete: OnDelete::Cascade,
    },
    Relation {
        constraint: "watchlist_user_fk",
        table: "watchlist",
        column: "user_id",
        references: "users",
        on_delete: OnDelete::Cascade,
    },
    Relation {
        constraint: "watchlist_listing_fk",
        table: "watchlist",
        column: "listing_id",
        references: "listings",
        on_delete: OnDelete::Cascade,
    },
];

/// Looks up a relation by constraint name
pub fn relation(constraint: &str) -> Option<&'static Relation> {
    RELATIONS.iter().find(|r| r.constraint == constraint)
}

fn singular(table: &str) -> &str {
    match table {
        "categories" => "category",
        other => other.strip_suffix('s').unwrap_or(other),
    }
}
