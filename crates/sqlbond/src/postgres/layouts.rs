use crate::exql::{Layouts, StatementKind};

const SELECT: &str = "SELECT {#distinct}DISTINCT {/distinct}\
    {^columns}*{/columns}{columns}\
    {#table} FROM {table}{/table}\
    {#joins} {joins}{/joins}\
    {#where} WHERE {where}{/where}\
    {#group_by} GROUP BY {group_by}{/group_by}\
    {#order_by} ORDER BY {order_by}{/order_by}\
    {#limit} LIMIT {limit}{/limit}\
    {#offset} OFFSET {offset}{/offset}";

const INSERT: &str = "INSERT INTO {table}\
    {#columns} ({columns}){/columns}\
    {#values} VALUES {values}{/values}\
    {^values} DEFAULT VALUES{/values}\
    {#returning} RETURNING {returning}{/returning}";

const UPDATE: &str = "UPDATE {table} SET {column_values}\
    {#where} WHERE {where}{/where}\
    {#returning} RETURNING {returning}{/returning}";

const DELETE: &str = "DELETE FROM {table}\
    {#where} WHERE {where}{/where}\
    {#returning} RETURNING {returning}{/returning}";

const COUNT: &str = "SELECT COUNT(1) AS _t FROM {table}\
    {#joins} {joins}{/joins}\
    {#where} WHERE {where}{/where}\
    {#group_by} GROUP BY {group_by}{/group_by}";

/// PostgreSQL dialect layouts.
pub fn layouts() -> Layouts {
    Layouts::new()
        .identifier_quote("\"")
        .layout(StatementKind::Select, SELECT)
        .layout(StatementKind::Insert, INSERT)
        .layout(StatementKind::Update, UPDATE)
        .layout(StatementKind::Delete, DELETE)
        .layout(StatementKind::Count, COUNT)
        .layout(StatementKind::Truncate, "TRUNCATE TABLE {table} RESTART IDENTITY")
        .layout(StatementKind::DropTable, "DROP TABLE {table}")
        .layout(StatementKind::DropDatabase, "DROP DATABASE {database}")
}
