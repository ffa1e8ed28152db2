use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        categories::CategoryList,
        named::NameRequest,
        orders::{CreateOrderRequest, OrderLineRequest, OrderList, UpdateOrderRequest},
        products::{ProductFormSchema, ProductList},
        roles::RoleList,
        tables::TableList,
        users::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, UserList},
    },
    models::{
        Category, DiningTable, Order, OrderItem, OrderLine, OrderStatus, OrderWithItems, Product,
        ProductWithCategory, Role, User, UserWithRole,
    },
    response::{ApiResponse, Meta},
    routes::{categories, health, orders, params, products, roles, tables, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        categories::create_category,
        categories::list_categories,
        categories::update_category,
        categories::delete_category,
        tables::create_table,
        tables::list_tables,
        tables::update_table,
        tables::delete_table,
        roles::create_role,
        roles::list_roles,
        roles::update_role,
        roles::delete_role,
        users::create_user,
        users::login,
        users::me,
        users::list_users,
        users::update_user,
        users::delete_user,
        products::create_product,
        products::list_products,
        products::update_product,
        products::delete_product,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order
    ),
    components(
        schemas(
            Category,
            DiningTable,
            Role,
            User,
            UserWithRole,
            Product,
            ProductWithCategory,
            Order,
            OrderItem,
            OrderLine,
            OrderStatus,
            OrderWithItems,
            NameRequest,
            CreateUserRequest,
            UpdateUserRequest,
            LoginRequest,
            LoginResponse,
            ProductFormSchema,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderLineRequest,
            CategoryList,
            TableList,
            RoleList,
            UserList,
            ProductList,
            OrderList,
            params::Pagination,
            Meta,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<DiningTable>,
            ApiResponse<TableList>,
            ApiResponse<Role>,
            ApiResponse<RoleList>,
            ApiResponse<User>,
            ApiResponse<UserList>,
            ApiResponse<LoginResponse>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Categories", description = "Product category endpoints"),
        (name = "Tables", description = "Dining table endpoints"),
        (name = "Roles", description = "Staff role endpoints"),
        (name = "Users", description = "Staff account and login endpoints"),
        (name = "Products", description = "Menu product endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_resource_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/category/create",
            "/api/table/update/{id}",
            "/api/role/delete/{id}",
            "/api/users/login",
            "/api/product/create",
            "/api/order/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
