use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            CREATE TABLE "jobs" (
                "job_id" uuid PRIMARY KEY,
                "bucket" text NOT NULL,
                "prefix" text,
                "created_at" timestamp NOT NULL DEFAULT now(),
                "updated_at" timestamp NOT NULL DEFAULT now()
            );

            CREATE TABLE "job_objects" (
                "job_id" uuid NOT NULL REFERENCES "jobs"("job_id") ON DELETE CASCADE,
                "bucket" text NOT NULL,
                "key" text NOT NULL,
                "entity_tag" text NOT NULL,
                "status" text NOT NULL DEFAULT 'queued',
                "last_error" text,
                "updated_at" timestamp NOT NULL DEFAULT now(),
                PRIMARY KEY ("job_id", "bucket", "key", "entity_tag"),
                CONSTRAINT "job_objects_status_check" CHECK (
                    "status" IN ('queued', 'processing', 'succeeded', 'failed')
                )
            );

            CREATE INDEX "job_objects_job_id_idx" ON "job_objects" ("job_id");

            CREATE TABLE "findings" (
                "id" bigserial PRIMARY KEY,
                "job_id" uuid NOT NULL REFERENCES "jobs"("job_id") ON DELETE CASCADE,
                "bucket" text NOT NULL,
                "key" text NOT NULL,
                "entity_tag" text NOT NULL,
                "detector" text NOT NULL,
                "masked_match" text NOT NULL,
                "context" text NOT NULL,
                "byte_offset" bigint NOT NULL,
                "created_at" timestamp NOT NULL DEFAULT now()
            );

            CREATE UNIQUE INDEX "findings_dedup_idx" ON "findings" (
                "bucket", "key", "entity_tag", "detector", "byte_offset"
            );

            CREATE INDEX "findings_job_id_idx" ON "findings" ("job_id");
            CREATE INDEX "findings_bucket_key_idx" ON "findings" ("bucket", "key");
            CREATE INDEX "findings_detector_idx" ON "findings" ("detector");
            CREATE INDEX "findings_created_at_idx" ON "findings" ("created_at" DESC);

            COMMENT ON TABLE "jobs" IS 'One row per client scan request';
            COMMENT ON TABLE "job_objects" IS 'Unit of work: one discovered object version under one job';
            COMMENT ON TABLE "findings" IS 'One row per detector match at a specific byte offset in a specific object version';
        "#;
        crate::from_sql(manager, sql).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE "findings";
            DROP TABLE "job_objects";
            DROP TABLE "jobs";
        "#;

        crate::from_sql(manager, sql).await
    }
}
