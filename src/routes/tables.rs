super::named::named_routes!(
    table_service, DiningTable, tables::TableList, "table", "Tables",
    ["/api/table/create", "/api/table", "/api/table/update/{id}", "/api/table/delete/{id}"],
    [create_table, list_tables, update_table, delete_table]
);
