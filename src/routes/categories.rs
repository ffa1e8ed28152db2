super::named::named_routes!(
    category_service, Category, categories::CategoryList, "category", "Categories",
    ["/api/category/create", "/api/category", "/api/category/update/{id}", "/api/category/delete/{id}"],
    [create_category, list_categories, update_category, delete_category]
);
