use model::Region;
use regions::database::{RegionRecord, Result, StorageError};
use sqlx::{Executor, Sqlite};
use utility::id::Id;

use crate::data_model::region::RegionRow;

use super::convert_error;

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<RegionRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows: Vec<RegionRow> = sqlx::query_as(
        "
        SELECT
            id,
            created_at,
            raw_bytes
        FROM
            regions
        ORDER BY
            seq ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;

    Ok(rows.into_iter().map(RegionRow::to_model).collect())
}

pub async fn put<'c, E>(executor: E, record: RegionRecord) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        "
        INSERT INTO regions(
            id,
            created_at,
            raw_bytes
        )
        VALUES (?1, ?2, ?3)
        ON CONFLICT (id)
        DO UPDATE SET
            created_at = EXCLUDED.created_at,
            raw_bytes = EXCLUDED.raw_bytes;
        ",
    )
    .bind(record.id.raw())
    .bind(record.created_at)
    .bind(record.raw_bytes)
    .execute(executor)
    .await
    .map_err(convert_error)?;
    Ok(())
}

pub async fn delete<'c, E>(executor: E, id: Id<Region>) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    let result = sqlx::query(
        "
        DELETE FROM
            regions
        WHERE
            id = ?1;
        ",
    )
    .bind(id.raw())
    .execute(executor)
    .await
    .map_err(convert_error)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound);
    }
    Ok(())
}

pub async fn delete_all<'c, E>(executor: E) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query("DELETE FROM regions;")
        .execute(executor)
        .await
        .map_err(convert_error)?;
    Ok(())
}
