pub const CREATE_INTERVENTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS interventions (
    seq BIGSERIAL NOT NULL,
    intervention_id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    latitude DOUBLE PRECISION NOT NULL,
    longitude DOUBLE PRECISION NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    citizen_id TEXT,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
"#;

pub const CREATE_CITIZEN_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_interventions_citizen_seq ON interventions (citizen_id, seq);
"#;

pub const INSERT_INTERVENTION: &str = r#"
INSERT INTO interventions (intervention_id, kind, latitude, longitude, description, citizen_id, status, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
"#;

pub const SELECT_INTERVENTION_BY_ID: &str = r#"
SELECT intervention_id, kind, latitude, longitude, description, citizen_id, status, created_at
FROM interventions
WHERE intervention_id = $1;
"#;

pub const SCAN_INTERVENTIONS: &str = r#"
SELECT intervention_id, kind, latitude, longitude, description, citizen_id, status, created_at
FROM interventions
WHERE ($1::TEXT IS NULL OR citizen_id = $1)
ORDER BY seq ASC
LIMIT $2;
"#;

pub const UPDATE_INTERVENTION_STATUS: &str = r#"
UPDATE interventions
SET status = $2
WHERE intervention_id = $1
  AND (CASE status
         WHEN 'COMPLETED' THEN 2 WHEN 'TERMINE' THEN 2
         WHEN 'IN_PROGRESS' THEN 1 WHEN 'EN_COURS' THEN 1
         ELSE 0
       END)
    < (CASE $2::TEXT
         WHEN 'COMPLETED' THEN 2
         WHEN 'IN_PROGRESS' THEN 1
         ELSE 0
       END);
"#;
