//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings, enums as strings with ASSERT constraints, calendar dates as
//! ISO `YYYY-MM-DD` strings. Parent links are plain id fields rather than
//! graph edges: every lookup in this application is a filter on the
//! parent id.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Agencies (global scope)
-- =======================================================================
DEFINE TABLE agency SCHEMAFULL;
DEFINE FIELD name ON TABLE agency TYPE string;
DEFINE FIELD slug ON TABLE agency TYPE string;
DEFINE FIELD metadata ON TABLE agency TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE agency TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE agency TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_agency_slug ON TABLE agency COLUMNS slug UNIQUE;

-- =======================================================================
-- Tenants (scoped to agency)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD agency_id ON TABLE tenant TYPE string;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD metadata ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_agency_slug ON TABLE tenant \
    COLUMNS agency_id, slug UNIQUE;
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug;

-- =======================================================================
-- Properties (tenant scope)
-- =======================================================================
DEFINE TABLE property SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE property TYPE string;
DEFINE FIELD slug ON TABLE property TYPE string;
DEFINE FIELD name ON TABLE property TYPE string;
DEFINE FIELD tagline ON TABLE property TYPE option<string>;
DEFINE FIELD description ON TABLE property TYPE option<string>;
DEFINE FIELD address ON TABLE property TYPE option<string>;
DEFINE FIELD contact_email ON TABLE property TYPE option<string>;
DEFINE FIELD contact_phone ON TABLE property TYPE option<string>;
DEFINE FIELD check_in_time ON TABLE property TYPE option<string>;
DEFINE FIELD check_out_time ON TABLE property TYPE option<string>;
DEFINE FIELD theme ON TABLE property TYPE string \
    ASSERT $value IN ['classic', 'coastal', 'alpine', 'garden', 'minimal'];
DEFINE FIELD status ON TABLE property TYPE string \
    ASSERT $value IN ['Draft', 'Published', 'Archived'];
DEFINE FIELD metadata ON TABLE property TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_property_tenant_slug ON TABLE property \
    COLUMNS tenant_id, slug UNIQUE;

-- =======================================================================
-- Domains (property scope, hostname globally unique)
-- =======================================================================
DEFINE TABLE site_domain SCHEMAFULL;
DEFINE FIELD property_id ON TABLE site_domain TYPE string;
DEFINE FIELD tenant_id ON TABLE site_domain TYPE string;
DEFINE FIELD hostname ON TABLE site_domain TYPE string;
DEFINE FIELD is_primary ON TABLE site_domain TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE site_domain TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE site_domain TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_domain_hostname ON TABLE site_domain \
    COLUMNS hostname UNIQUE;
DEFINE INDEX idx_domain_property ON TABLE site_domain \
    COLUMNS property_id;

-- =======================================================================
-- Users (global scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE option<string>;
DEFINE FIELD phone ON TABLE user TYPE option<string>;
DEFINE FIELD password_hash ON TABLE user TYPE option<string>;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Active', 'Invited', 'Disabled'];
DEFINE FIELD agency_id ON TABLE user TYPE option<string>;
DEFINE FIELD invite_token_hash ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_invite ON TABLE user COLUMNS invite_token_hash;

-- =======================================================================
-- Memberships (user <-> tenant with role)
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD tenant_id ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string \
    ASSERT $value IN ['Owner', 'Admin', 'Editor', 'Viewer'];
DEFINE FIELD created_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_user_tenant ON TABLE membership \
    COLUMNS user_id, tenant_id UNIQUE;
DEFINE INDEX idx_membership_tenant ON TABLE membership \
    COLUMNS tenant_id;

-- =======================================================================
-- Rooms (property scope)
-- =======================================================================
DEFINE TABLE room SCHEMAFULL;
DEFINE FIELD property_id ON TABLE room TYPE string;
DEFINE FIELD name ON TABLE room TYPE string;
DEFINE FIELD slug ON TABLE room TYPE string;
DEFINE FIELD description ON TABLE room TYPE option<string>;
DEFINE FIELD capacity ON TABLE room TYPE int;
DEFINE FIELD beds ON TABLE room TYPE int;
DEFINE FIELD sort_order ON TABLE room TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE room TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE room TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_room_property_slug ON TABLE room \
    COLUMNS property_id, slug UNIQUE;

-- =======================================================================
-- Hosts (property scope)
-- =======================================================================
DEFINE TABLE property_host SCHEMAFULL;
DEFINE FIELD property_id ON TABLE property_host TYPE string;
DEFINE FIELD name ON TABLE property_host TYPE string;
DEFINE FIELD bio ON TABLE property_host TYPE option<string>;
DEFINE FIELD photo_url ON TABLE property_host TYPE option<string>;
DEFINE FIELD sort_order ON TABLE property_host TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE property_host TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE property_host TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_host_property ON TABLE property_host \
    COLUMNS property_id;

-- =======================================================================
-- Pricing rules (property scope, optionally per room)
-- =======================================================================
DEFINE TABLE pricing_rule SCHEMAFULL;
DEFINE FIELD property_id ON TABLE pricing_rule TYPE string;
DEFINE FIELD room_id ON TABLE pricing_rule TYPE option<string>;
DEFINE FIELD label ON TABLE pricing_rule TYPE string;
DEFINE FIELD amount_minor ON TABLE pricing_rule TYPE int;
DEFINE FIELD currency ON TABLE pricing_rule TYPE string;
DEFINE FIELD starts_on ON TABLE pricing_rule TYPE option<string>;
DEFINE FIELD ends_on ON TABLE pricing_rule TYPE option<string>;
DEFINE FIELD min_nights ON TABLE pricing_rule TYPE int DEFAULT 1;
DEFINE FIELD sort_order ON TABLE pricing_rule TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE pricing_rule TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE pricing_rule TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_pricing_property ON TABLE pricing_rule \
    COLUMNS property_id;

-- =======================================================================
-- Media assets (property scope)
-- =======================================================================
DEFINE TABLE media_asset SCHEMAFULL;
DEFINE FIELD property_id ON TABLE media_asset TYPE string;
DEFINE FIELD room_id ON TABLE media_asset TYPE option<string>;
DEFINE FIELD kind ON TABLE media_asset TYPE string \
    ASSERT $value IN ['Image', 'Video', 'Document'];
DEFINE FIELD storage_key ON TABLE media_asset TYPE option<string>;
DEFINE FIELD public_url ON TABLE media_asset TYPE string;
DEFINE FIELD alt_text ON TABLE media_asset TYPE option<string>;
DEFINE FIELD sort_order ON TABLE media_asset TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE media_asset TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE media_asset TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_media_property ON TABLE media_asset \
    COLUMNS property_id;

-- =======================================================================
-- Content blocks (property scope, one per key)
-- =======================================================================
DEFINE TABLE content_block SCHEMAFULL;
DEFINE FIELD property_id ON TABLE content_block TYPE string;
DEFINE FIELD block_key ON TABLE content_block TYPE string;
DEFINE FIELD data ON TABLE content_block TYPE any;
DEFINE FIELD created_at ON TABLE content_block TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE content_block TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_content_property_key ON TABLE content_block \
    COLUMNS property_id, block_key UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
