//! Schema bootstrap
//!
//! The SQL artifacts under `migrations/` are compiled into the binary and run
//! once at process start, each as a single batch, in this order:
//! definition → ddl → indexes → functions → triggers.
//!
//! Artifacts are written to be replayable (`IF NOT EXISTS`, `OR REPLACE`,
//! guarded `ALTER TABLE`), so running the bootstrap against an existing schema
//! is a no-op.

use std::fmt;

use sea_orm::sqlx::postgres::{PgDatabaseError, PgErrorPosition};
use sea_orm::{ConnectionTrait, DbErr, RuntimeErr};
use tracing::{error, info};

/// One embedded SQL batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Execution order. Constraints must exist before indexes are built on them.
pub const ARTIFACTS: [Artifact; 5] = [
    Artifact {
        name: "definition",
        sql: include_str!("../migrations/definition.sql"),
    },
    Artifact {
        name: "ddl",
        sql: include_str!("../migrations/ddl.sql"),
    },
    Artifact {
        name: "indexes",
        sql: include_str!("../migrations/indexes.sql"),
    },
    Artifact {
        name: "functions",
        sql: include_str!("../migrations/functions.sql"),
    },
    Artifact {
        name: "triggers",
        sql: include_str!("../migrations/triggers.sql"),
    },
];

/// Diagnostic fields reported by the store for a failed statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreDiagnostics {
    pub message: String,
    pub code: Option<String>,
    pub position: Option<usize>,
    pub hint: Option<String>,
    pub detail: Option<String>,
    pub constraint: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
    pub data_type: Option<String>,
}

impl StoreDiagnostics {
    fn from_db_err(err: &DbErr) -> Self {
        let runtime = match err {
            DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => Some(runtime),
            _ => None,
        };

        let pg = match runtime {
            Some(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err))) => {
                db_err.try_downcast_ref::<PgDatabaseError>()
            }
            _ => None,
        };

        let Some(pg) = pg else {
            return Self {
                message: err.to_string(),
                ..Default::default()
            };
        };

        Self {
            message: pg.message().to_string(),
            code: Some(pg.code().to_string()),
            position: pg.position().map(|p| match p {
                PgErrorPosition::Original(pos) => pos,
                PgErrorPosition::Internal { position, .. } => position,
            }),
            hint: pg.hint().map(str::to_string),
            detail: pg.detail().map(str::to_string),
            constraint: pg.constraint().map(str::to_string),
            schema: pg.schema().map(str::to_string),
            table: pg.table().map(str::to_string),
            column: pg.column().map(str::to_string),
            data_type: pg.data_type().map(str::to_string),
        }
    }
}

impl fmt::Display for StoreDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;

        let fields: [(&str, Option<String>); 9] = [
            ("code", self.code.clone()),
            ("position", self.position.map(|p| p.to_string())),
            ("hint", self.hint.clone()),
            ("detail", self.detail.clone()),
            ("constraint", self.constraint.clone()),
            ("schema", self.schema.clone()),
            ("table", self.table.clone()),
            ("column", self.column.clone()),
            ("data_type", self.data_type.clone()),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                write!(f, ", {}={}", label, value)?;
            }
        }
        Ok(())
    }
}

/// A failed artifact, with the store's diagnostics attached.
#[derive(Debug, thiserror::Error)]
#[error("failed to execute migration artifact '{artifact}': {diagnostics}")]
pub struct MigrationError {
    pub artifact: &'static str,
    pub diagnostics: StoreDiagnostics,
    #[source]
    pub source: DbErr,
}

/// Run every artifact in order, stopping at the first failure.
pub async fn run_migrations<C>(db: &C) -> Result<(), MigrationError>
where
    C: ConnectionTrait,
{
    run_artifacts(db, &ARTIFACTS).await
}

async fn run_artifacts<C>(db: &C, artifacts: &[Artifact]) -> Result<(), MigrationError>
where
    C: ConnectionTrait,
{
    for artifact in artifacts {
        info!(artifact = artifact.name, "Applying schema artifact");

        if let Err(source) = db.execute_unprepared(artifact.sql).await {
            let diagnostics = StoreDiagnostics::from_db_err(&source);
            error!(
                artifact = artifact.name,
                code = diagnostics.code.as_deref().unwrap_or(""),
                position = diagnostics.position,
                hint = diagnostics.hint.as_deref().unwrap_or(""),
                constraint = diagnostics.constraint.as_deref().unwrap_or(""),
                table = diagnostics.table.as_deref().unwrap_or(""),
                column = diagnostics.column.as_deref().unwrap_or(""),
                "Schema artifact failed: {}",
                diagnostics.message
            );
            return Err(MigrationError {
                artifact: artifact.name,
                diagnostics,
                source,
            });
        }
    }

    info!(count = artifacts.len(), "Schema bootstrap complete");
    Ok(())
}
