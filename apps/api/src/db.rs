use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Tables written by `PgEvaluationStore`. Applied in order; each is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id               UUID PRIMARY KEY,
        candidate_name   TEXT,
        email            TEXT,
        phone            TEXT,
        experience_years DOUBLE PRECISION NOT NULL DEFAULT 0,
        profile          JSONB NOT NULL,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_descriptions (
        id                  UUID PRIMARY KEY,
        title               TEXT NOT NULL,
        experience_required DOUBLE PRECISION NOT NULL DEFAULT 0,
        requirement         JSONB NOT NULL,
        created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS evaluations (
        id                 UUID PRIMARY KEY,
        resume_id          UUID NOT NULL REFERENCES resumes(id),
        job_description_id UUID REFERENCES job_descriptions(id),
        overall_score      DOUBLE PRECISION,
        semantic_score     DOUBLE PRECISION NOT NULL,
        skill_match_score  DOUBLE PRECISION NOT NULL,
        experience_score   DOUBLE PRECISION NOT NULL,
        education_score    DOUBLE PRECISION NOT NULL,
        candidate_ranking  INTEGER,
        skill_gap          JSONB NOT NULL,
        similar_candidates JSONB NOT NULL,
        recommendations    JSONB NOT NULL,
        recommendation_text TEXT NOT NULL,
        completed_steps    TEXT[] NOT NULL,
        errors             TEXT[] NOT NULL,
        status             TEXT NOT NULL,
        created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS evaluations_job_idx ON evaluations (job_description_id)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the evaluation tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
