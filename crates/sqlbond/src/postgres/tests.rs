use super::*;
use crate::adapter::adapter;
use crate::exql::{
    ColumnValues, Columns, Condition, Database, GroupBy, Join, Joins, OrderBy, Returning,
    SortColumn, Statement, Table, Template, Values, Where,
};
use crate::param::Param;
use bytes::BytesMut;
use tokio_postgres::types::{ToSql, Type};

fn template() -> Template {
    Template::new(layouts()).unwrap()
}

#[test]
fn test_rewrite_placeholders() {
    assert_eq!(
        rewrite_placeholders("SELECT * FROM t WHERE a = ? AND b = ?"),
        "SELECT * FROM t WHERE a = $1 AND b = $2"
    );
    assert_eq!(
        rewrite_placeholders("SELECT '?' , \"we?rd\" FROM t WHERE a = ?"),
        "SELECT '?' , \"we?rd\" FROM t WHERE a = $1"
    );
    assert_eq!(
        rewrite_placeholders("SELECT data ?? 'key' FROM t WHERE id = ?"),
        "SELECT data ? 'key' FROM t WHERE id = $1"
    );
    assert_eq!(
        rewrite_placeholders("SELECT 1 -- why?\nFROM t /* really? */ WHERE a = ?"),
        "SELECT 1 -- why?\nFROM t /* really? */ WHERE a = $1"
    );
    assert_eq!(rewrite_placeholders("SELECT 1"), "SELECT 1");
}

#[test]
fn test_rewrite_placeholders_skips_escape_and_dollar_strings() {
    assert_eq!(
        rewrite_placeholders(r"SELECT E'it\'s ?' , 'a''?' WHERE a = ?"),
        r"SELECT E'it\'s ?' , 'a''?' WHERE a = $1"
    );
    assert_eq!(
        rewrite_placeholders("SELECT $$why?$$, $fn$ok? $$ still?$fn$ WHERE a = ? AND b = ?"),
        "SELECT $$why?$$, $fn$ok? $$ still?$fn$ WHERE a = $1 AND b = $2"
    );
    // Already-numbered parameters and identifiers ending in `e` are not quotes.
    assert_eq!(
        rewrite_placeholders("SELECT $1, name'x' FROM t WHERE code = ?"),
        "SELECT $1, name'x' FROM t WHERE code = $1"
    );
}

#[test]
fn test_select_layout() {
    let t = template();
    let stmt = Statement::select()
        .columns(Columns::new(["id", "name"]))
        .table(Table::new("users"))
        .where_clause(Where::bind_eq(["status"]))
        .order_by(OrderBy::new([SortColumn::desc("created_at")]))
        .limit(10)
        .offset(20);
    assert_eq!(
        stmt.compile(&t),
        r#"SELECT "id", "name" FROM "users" WHERE "status" = ? ORDER BY "created_at" DESC LIMIT 10 OFFSET 20"#
    );
}

#[test]
fn test_select_with_joins_and_grouping() {
    let t = template();
    let stmt = Statement::select()
        .distinct(true)
        .columns(Columns::new(["u.id"]))
        .table(Table::new("users AS u"))
        .joins(Joins::new([Join::inner("orders AS o").using(Columns::new(["user_id"]))]))
        .group_by(GroupBy::new(["u.id"]));
    assert_eq!(
        stmt.compile(&t),
        r#"SELECT DISTINCT "u"."id" FROM "users" AS "u" JOIN "orders" AS "o" USING ("user_id") GROUP BY "u"."id""#
    );
}

#[test]
fn test_insert_layouts() {
    let t = template();
    let stmt = Statement::insert()
        .table(Table::new("users"))
        .columns(Columns::new(["name"]))
        .values(Values::placeholders(1))
        .returning(Returning::new(["id"]));
    assert_eq!(
        stmt.compile(&t),
        r#"INSERT INTO "users" ("name") VALUES (?) RETURNING "id""#
    );

    let defaults = Statement::insert().table(Table::new("events"));
    assert_eq!(defaults.compile(&t), r#"INSERT INTO "events" DEFAULT VALUES"#);
}

#[test]
fn test_update_delete_count_layouts() {
    let t = template();
    let update = Statement::update()
        .table(Table::new("users"))
        .column_values(ColumnValues::bind(["name"]))
        .where_clause(Where::bind_eq(["id"]));
    assert_eq!(
        update.compile(&t),
        r#"UPDATE "users" SET "name" = ? WHERE "id" = ?"#
    );

    let delete = Statement::delete()
        .table(Table::new("users"))
        .where_clause(Where::new([Condition::is_null("deleted_at")]));
    assert_eq!(
        delete.compile(&t),
        r#"DELETE FROM "users" WHERE "deleted_at" IS NULL"#
    );

    let count = Statement::count().table(Table::new("users"));
    assert_eq!(count.compile(&t), r#"SELECT COUNT(1) AS _t FROM "users""#);
}

#[test]
fn test_ddl_layouts() {
    let t = template();
    assert_eq!(
        Statement::truncate().table(Table::new("users")).compile(&t),
        r#"TRUNCATE TABLE "users" RESTART IDENTITY"#
    );
    assert_eq!(
        Statement::drop_table().table(Table::new("users")).compile(&t),
        r#"DROP TABLE "users""#
    );
    assert_eq!(
        Statement::drop_database().database(Database::new("app")).compile(&t),
        r#"DROP DATABASE "app""#
    );
}

#[test]
fn test_param_to_sql_narrows_integers() {
    let mut out = BytesMut::new();
    Param::Int(7).to_sql_checked(&Type::INT4, &mut out).unwrap();
    assert_eq!(&out[..], &7_i32.to_be_bytes());

    let mut out = BytesMut::new();
    assert!(Param::Int(i64::MAX).to_sql_checked(&Type::INT2, &mut out).is_err());
}

#[test]
fn test_param_to_sql_checks_types() {
    let mut out = BytesMut::new();
    assert!(Param::Bool(true).to_sql_checked(&Type::INT4, &mut out).is_err());

    let mut out = BytesMut::new();
    let is_null = Param::Null.to_sql_checked(&Type::DATE, &mut out).unwrap();
    assert!(matches!(is_null, tokio_postgres::types::IsNull::Yes));
}

#[test]
fn test_create_pool_rejects_bad_url() {
    let err = create_pool("not a url ::").unwrap_err();
    assert!(matches!(err, crate::error::BondError::Connection(_)));
}

#[test]
fn test_adapter_is_registered() {
    let pg = adapter(ADAPTER).unwrap();
    assert_eq!(pg.template().layouts(), &layouts());
}
