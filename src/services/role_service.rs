super::named::named_service!(
    roles, Role, roles::RoleList, "Role", "Roles",
    [list_roles, create_role, update_role, delete_role]
);
