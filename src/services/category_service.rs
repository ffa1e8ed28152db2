super::named::named_service!(
    categories, Category, categories::CategoryList, "Category", "Categories",
    [list_categories, create_category, update_category, delete_category]
);
