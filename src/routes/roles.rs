super::named::named_routes!(
    role_service, Role, roles::RoleList, "role", "Roles",
    ["/api/role/create", "/api/role", "/api/role/update/{id}", "/api/role/delete/{id}"],
    [create_role, list_roles, update_role, delete_role]
);
