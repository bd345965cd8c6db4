//! Round trip against a live PostgreSQL server. Skipped unless `DATABASE_URL`
//! is set (a `.env` file is honoured).

#![cfg(feature = "postgres")]

use jetsql::{Error, Expr};
use jetsql::prelude::*;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_postgres::{Client, NoTls};

async fn connect(test: &str) -> Result<Option<Client>, Error> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls).await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{nanos}", std::process::id())
}

struct Accounts {
    table: Table,
    id: IntegerColumn,
    owner: TextColumn,
    balance: FloatColumn,
}

async fn create_accounts(client: &Client) -> Result<Accounts, Error> {
    let name = unique_name("jetsql_accounts");
    client
        .batch_execute(&format!(
            "CREATE TEMP TABLE {name} (id INT PRIMARY KEY, owner TEXT NOT NULL, balance FLOAT8 NOT NULL)"
        ))
        .await?;
    let table = Table::new(&name);
    Ok(Accounts {
        id: table.column("id"),
        owner: table.column("owner"),
        balance: table.column("balance"),
        table,
    })
}

#[tokio::test]
async fn crud_roundtrip() -> Result<(), Error> {
    let Some(client) = connect("crud_roundtrip").await? else {
        return Ok(());
    };
    let a = create_accounts(&client).await?;

    let inserted = a
        .table
        .insert(&[&a.id, &a.owner, &a.balance])
        .values([Expr::from(1), Expr::from("ann"), Expr::from(10.0)])
        .values([Expr::from(2), Expr::from("bob"), Expr::from(20.5)])
        .values([Expr::from(3), Expr::from("cid"), Expr::from(0.0)])
        .exec(&client)
        .await?;
    assert_eq!(inserted, 3);

    let updated = a
        .table
        .update()
        .set(a.balance.set(a.balance.add(5.0)))
        .where_expr(a.owner.in_list(["ann", "bob"]))
        .exec(&client)
        .await?;
    assert_eq!(updated, 2);

    let rows = a
        .table
        .select(&[&a.id, &a.owner, &a.balance])
        .where_expr(a.balance.gt(1.0))
        .order_by([a.id.asc()])
        .limit(10)
        .query(&client)
        .await?;
    let balance_column = format!("{}.balance", a.table.name());
    let got: Vec<(i32, String, f64)> = rows
        .iter()
        .map(|row| (row.get(0), row.get(1), row.get(balance_column.as_str())))
        .collect();
    assert_eq!(
        got,
        vec![(1, "ann".to_string(), 15.0), (2, "bob".to_string(), 25.5)]
    );

    let deleted = a
        .table
        .delete()
        .where_expr(a.balance.eq(0.0))
        .exec(&client)
        .await?;
    assert_eq!(deleted, 1);

    let count = select(&[&count_star().alias("n")])
        .from(&a.table)
        .query(&client)
        .await?;
    assert_eq!(count[0].get::<_, i64>("n"), 2);
    Ok(())
}

#[tokio::test]
async fn derived_table_roundtrip() -> Result<(), Error> {
    let Some(client) = connect("derived_table_roundtrip").await? else {
        return Ok(());
    };
    let a = create_accounts(&client).await?;
    a.table
        .insert(&[&a.id, &a.owner, &a.balance])
        .values([Expr::from(1), Expr::from("ann"), Expr::from(1.0)])
        .values([Expr::from(2), Expr::from("ann"), Expr::from(2.0)])
        .values([Expr::from(3), Expr::from("bob"), Expr::from(4.0)])
        .exec(&client)
        .await?;

    let totals = select(&[&a.owner, &sum(&a.balance).alias("total")])
        .from(&a.table)
        .group_by(&[&a.owner])
        .as_table("totals")?;
    let owner = a.owner.from_table(&totals)?;
    let total = totals.column::<Float>("total")?;

    let rows = totals
        .select(&[&owner, &total])
        .where_expr(total.gt_eq(3.0))
        .order_by([owner.asc()])
        .query(&client)
        .await?;
    let got: Vec<(String, f64)> = rows.iter().map(|row| (row.get(0), row.get(1))).collect();
    assert_eq!(got, vec![("ann".to_string(), 3.0), ("bob".to_string(), 4.0)]);
    Ok(())
}

#[tokio::test]
async fn transaction_commit_and_rollback() -> Result<(), Error> {
    let Some(mut client) = connect("transaction_commit_and_rollback").await? else {
        return Ok(());
    };
    let a = create_accounts(&client).await?;
    let insert = |id: i32| {
        a.table
            .insert(&[&a.id, &a.owner, &a.balance])
            .values([Expr::from(id), Expr::from("tx"), Expr::from(1.0)])
    };

    let tx = client.begin().await?;
    a.table
        .lock()
        .in_mode(TableLockMode::ShareRowExclusive)
        .exec(&tx)
        .await?;
    insert(1).exec(&tx).await?;
    jetsql::Transaction::commit(tx).await?;

    let tx = client.begin().await?;
    insert(2).exec(&tx).await?;
    jetsql::Transaction::rollback(tx).await?;

    let rows = select(&[&a.id]).from(&a.table).query(&client).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get::<_, i32>(0), 1);
    Ok(())
}

#[tokio::test]
async fn db_timeout_cancels_statement() -> Result<(), Error> {
    let Some(client) = connect("db_timeout_cancels_statement").await? else {
        return Ok(());
    };
    let db = Db::new(client)
        .with_config(DbConfig::new().with_query_timeout(Duration::from_millis(100)));

    let sleep = select(&[&raw::<Integer>("(SELECT 1 FROM pg_sleep(?))", [5.0]).alias("slept")]);
    let err = sleep.query(&db).await.unwrap_err();
    assert!(err.is_deadline_exceeded(), "{err}");
    Ok(())
}

#[tokio::test]
async fn cached_statements_survive_transactions() -> Result<(), Error> {
    let Some(client) = connect("cached_statements_survive_transactions").await? else {
        return Ok(());
    };
    let a = create_accounts(&client).await?;
    let mut db = Db::new(client).with_config(DbConfig::new().with_statement_cache(16));

    let insert = |id: i32| {
        a.table
            .insert(&[&a.id, &a.owner, &a.balance])
            .values([Expr::from(id), Expr::from("cache"), Expr::from(1.0)])
    };
    insert(1).exec(&db).await?;
    insert(2).exec(&db).await?;
    assert_eq!(db.cached_statements(), 1);

    let tx = db.begin().await?;
    insert(3).exec(&tx).await?;
    jetsql::Transaction::commit(tx).await?;
    assert_eq!(db.cached_statements(), 1);

    let by_id = |id: i32| select(&[&a.owner]).from(&a.table).where_expr(a.id.eq(id));
    for id in 1..=3 {
        let rows = by_id(id).query(&db).await?;
        assert_eq!(rows[0].get::<_, String>(0), "cache");
    }
    assert_eq!(db.cached_statements(), 2);
    Ok(())
}
