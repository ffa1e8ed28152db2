super::named::named_service!(
    dining_tables, DiningTable, tables::TableList, "Table", "Tables",
    [list_tables, create_table, update_table, delete_table]
);
