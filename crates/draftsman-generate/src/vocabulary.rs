//! Keyword tables used to draft models from free text.
//!
//! Matching is a case-insensitive substring test against any keyword of an
//! entry. Each entry contributes at most one object, in table order.

use draftsman_core::{
    Actor, ActorKind, ArchitectureModule, Attribute, Entity, ErEntity, ErField, Method, ModuleKind,
    Parameter, Priority, Status, UseCase, ValueObject,
};

pub struct ActorTerm {
    pub keywords: &'static [&'static str],
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ActorKind,
    pub description: &'static str,
}

pub struct UseCaseTerm {
    pub keywords: &'static [&'static str],
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preconditions: &'static [&'static str],
    pub postconditions: &'static [&'static str],
    pub main_flow: &'static [&'static str],
    pub priority: Priority,
}

/// `(name, type, required)`
type AttributeTerm = (&'static str, &'static str, bool);

/// `(name, parameters, return type)`
type MethodTerm = (&'static str, &'static [(&'static str, &'static str)], &'static str);

pub struct EntityTerm {
    pub keywords: &'static [&'static str],
    pub id: &'static str,
    pub name: &'static str,
    pub attributes: &'static [AttributeTerm],
    pub methods: &'static [MethodTerm],
    pub aggregate_root: bool,
}

pub struct ValueObjectTerm {
    pub keywords: &'static [&'static str],
    pub id: &'static str,
    pub name: &'static str,
    pub attributes: &'static [AttributeTerm],
    pub invariants: &'static [&'static str],
}

pub struct FieldTerm {
    pub name: &'static str,
    pub data_type: &'static str,
    pub length: Option<u32>,
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
}

const fn pk(name: &'static str) -> FieldTerm {
    FieldTerm { name, data_type: "bigint", length: None, primary_key: true, unique: false, nullable: false }
}

const fn col(name: &'static str, data_type: &'static str, length: Option<u32>, nullable: bool) -> FieldTerm {
    FieldTerm { name, data_type, length, primary_key: false, unique: false, nullable }
}

const fn uniq(name: &'static str, data_type: &'static str, length: Option<u32>) -> FieldTerm {
    FieldTerm { name, data_type, length, primary_key: false, unique: true, nullable: false }
}

pub struct TableTerm {
    pub keywords: &'static [&'static str],
    pub table: &'static str,
    pub fields: &'static [FieldTerm],
}

pub struct ModuleTerm {
    pub keywords: &'static [&'static str],
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ModuleKind,
    pub technology: &'static str,
    pub color: &'static str,
}

pub const ACTORS: &[ActorTerm] = &[
    ActorTerm {
        keywords: &["用户", "user", "customer", "客户"],
        id: "user",
        name: "User",
        kind: ActorKind::Primary,
        description: "End user of the system",
    },
    ActorTerm {
        keywords: &["管理员", "admin"],
        id: "admin",
        name: "Administrator",
        kind: ActorKind::Secondary,
        description: "Operates and configures the system",
    },
    ActorTerm {
        keywords: &["系统", "system"],
        id: "external_system",
        name: "External System",
        kind: ActorKind::System,
        description: "Third-party system integrated with this one",
    },
    ActorTerm {
        keywords: &["支付", "payment"],
        id: "payment_gateway",
        name: "Payment Gateway",
        kind: ActorKind::System,
        description: "Processes card and wallet payments",
    },
];

pub const USE_CASES: &[UseCaseTerm] = &[
    UseCaseTerm {
        keywords: &["登录", "login", "log in", "sign in"],
        id: "login",
        name: "Login",
        description: "Authenticate with username and password",
        preconditions: &["User has a registered account"],
        postconditions: &["User is authenticated", "A session is created"],
        main_flow: &[
            "User opens the login page",
            "User enters username and password",
            "System validates the credentials",
            "System creates a session and redirects to the home page",
        ],
        priority: Priority::High,
    },
    UseCaseTerm {
        keywords: &["注册", "register", "sign up"],
        id: "register",
        name: "Register",
        description: "Create a new account",
        preconditions: &["Visitor is not logged in"],
        postconditions: &["A new account exists", "A confirmation email is sent"],
        main_flow: &[
            "Visitor opens the registration page",
            "Visitor enters account details",
            "System checks that the username is free",
            "System creates the account",
        ],
        priority: Priority::High,
    },
    UseCaseTerm {
        keywords: &["下单", "订单", "order"],
        id: "place_order",
        name: "Place Order",
        description: "Turn the shopping cart into an order",
        preconditions: &["User is authenticated", "Cart is not empty"],
        postconditions: &["Order is created with status pending"],
        main_flow: &[
            "User reviews the cart",
            "User confirms the shipping address",
            "System reserves stock",
            "System creates the order",
        ],
        priority: Priority::High,
    },
    UseCaseTerm {
        keywords: &["支付", "pay"],
        id: "make_payment",
        name: "Make Payment",
        description: "Pay for an order",
        preconditions: &["Order is pending"],
        postconditions: &["Order is paid"],
        main_flow: &[
            "User selects a payment method",
            "System forwards the charge to the payment gateway",
            "Payment gateway confirms the charge",
            "System marks the order as paid",
        ],
        priority: Priority::High,
    },
    UseCaseTerm {
        keywords: &["搜索", "查询", "search"],
        id: "search",
        name: "Search",
        description: "Find items by keyword",
        preconditions: &[],
        postconditions: &["Matching items are listed"],
        main_flow: &[
            "User enters a keyword",
            "System queries the catalogue",
            "System shows the results",
        ],
        priority: Priority::Medium,
    },
    UseCaseTerm {
        keywords: &["管理", "manage"],
        id: "manage_users",
        name: "Manage Users",
        description: "Create, disable and edit user accounts",
        preconditions: &["Administrator is authenticated"],
        postconditions: &["User accounts reflect the changes"],
        main_flow: &[
            "Administrator opens the user list",
            "Administrator selects an account",
            "Administrator edits or disables the account",
            "System records the change in the audit log",
        ],
        priority: Priority::Medium,
    },
    UseCaseTerm {
        keywords: &["报表", "统计", "report"],
        id: "generate_report",
        name: "Generate Report",
        description: "Summarise activity over a period",
        preconditions: &["Data exists for the selected period"],
        postconditions: &["Report is available for download"],
        main_flow: &[
            "User selects a period",
            "System aggregates the data",
            "System renders the report",
        ],
        priority: Priority::Low,
    },
];

pub const ENTITIES: &[EntityTerm] = &[
    EntityTerm {
        keywords: &["用户", "user", "customer"],
        id: "user",
        name: "User",
        attributes: &[
            ("id", "string", true),
            ("name", "string", true),
            ("email", "string", true),
            ("phone", "string", false),
        ],
        methods: &[("changeEmail", &[("email", "string")], "void")],
        aggregate_root: true,
    },
    EntityTerm {
        keywords: &["订单", "order"],
        id: "order",
        name: "Order",
        attributes: &[
            ("id", "string", true),
            ("userId", "string", true),
            ("total", "number", true),
            ("status", "string", true),
            ("createdAt", "Date", true),
        ],
        methods: &[
            ("addItem", &[("productId", "string"), ("quantity", "number")], "void"),
            ("cancel", &[], "void"),
        ],
        aggregate_root: true,
    },
    EntityTerm {
        keywords: &["订单项", "明细", "order item", "line item"],
        id: "order_item",
        name: "OrderItem",
        attributes: &[
            ("id", "string", true),
            ("productId", "string", true),
            ("quantity", "number", true),
            ("price", "number", true),
        ],
        methods: &[],
        aggregate_root: false,
    },
    EntityTerm {
        keywords: &["商品", "产品", "product"],
        id: "product",
        name: "Product",
        attributes: &[
            ("id", "string", true),
            ("name", "string", true),
            ("price", "number", true),
            ("description", "string", false),
        ],
        methods: &[("changePrice", &[("price", "number")], "void")],
        aggregate_root: true,
    },
    EntityTerm {
        keywords: &["支付", "payment"],
        id: "payment",
        name: "Payment",
        attributes: &[
            ("id", "string", true),
            ("orderId", "string", true),
            ("amount", "number", true),
            ("method", "string", false),
            ("paidAt", "Date", false),
        ],
        methods: &[],
        aggregate_root: false,
    },
    EntityTerm {
        keywords: &["库存", "inventory", "stock"],
        id: "inventory",
        name: "Inventory",
        attributes: &[
            ("productId", "string", true),
            ("quantity", "number", true),
            ("reserved", "number", false),
        ],
        methods: &[
            ("reserve", &[("quantity", "number")], "boolean"),
            ("release", &[("quantity", "number")], "void"),
        ],
        aggregate_root: true,
    },
];

pub const VALUE_OBJECTS: &[ValueObjectTerm] = &[
    ValueObjectTerm {
        keywords: &["地址", "address"],
        id: "address",
        name: "Address",
        attributes: &[
            ("street", "string", true),
            ("city", "string", true),
            ("zipCode", "string", false),
        ],
        invariants: &["city must not be empty"],
    },
    ValueObjectTerm {
        keywords: &["金额", "价格", "money", "price", "amount"],
        id: "money",
        name: "Money",
        attributes: &[("amount", "number", true), ("currency", "string", true)],
        invariants: &["amount >= 0", "currency is an ISO 4217 code"],
    },
];

pub const TABLES: &[TableTerm] = &[
    TableTerm {
        keywords: &["用户", "user", "customer"],
        table: "users",
        fields: &[
            pk("id"),
            uniq("username", "varchar", Some(50)),
            uniq("email", "varchar", Some(100)),
            col("password_hash", "varchar", Some(255), false),
            col("created_at", "timestamp", None, false),
        ],
    },
    TableTerm {
        keywords: &["订单", "order"],
        table: "orders",
        fields: &[
            pk("id"),
            col("user_id", "bigint", None, false),
            col("total_amount", "decimal", None, false),
            col("status", "varchar", Some(20), false),
            col("created_at", "timestamp", None, false),
        ],
    },
    TableTerm {
        keywords: &["商品", "产品", "product"],
        table: "products",
        fields: &[
            pk("id"),
            col("name", "varchar", Some(100), false),
            col("price", "decimal", None, false),
            col("description", "text", None, true),
        ],
    },
    TableTerm {
        keywords: &["订单项", "明细", "order item", "line item"],
        table: "order_items",
        fields: &[
            pk("id"),
            col("order_id", "bigint", None, false),
            col("product_id", "bigint", None, false),
            col("quantity", "int", None, false),
            col("unit_price", "decimal", None, false),
        ],
    },
    TableTerm {
        keywords: &["支付", "payment"],
        table: "payments",
        fields: &[
            pk("id"),
            col("order_id", "bigint", None, false),
            col("amount", "decimal", None, false),
            col("method", "varchar", Some(20), true),
            col("paid_at", "timestamp", None, true),
        ],
    },
];

pub const MODULES: &[ModuleTerm] = &[
    ModuleTerm {
        keywords: &["前端", "网站", "web", "frontend", "browser"],
        id: "web",
        name: "Web App",
        kind: ModuleKind::Frontend,
        technology: "React",
        color: "#52c41a",
    },
    ModuleTerm {
        keywords: &["移动端", "mobile", "ios", "android"],
        id: "mobile",
        name: "Mobile App",
        kind: ModuleKind::Frontend,
        technology: "React Native",
        color: "#52c41a",
    },
    ModuleTerm {
        keywords: &["网关", "gateway", "api"],
        id: "gateway",
        name: "API Gateway",
        kind: ModuleKind::Gateway,
        technology: "Nginx",
        color: "#faad14",
    },
    ModuleTerm {
        keywords: &["后端", "服务", "backend", "service", "server"],
        id: "app",
        name: "Application Service",
        kind: ModuleKind::Backend,
        technology: "Spring Boot",
        color: "#722ed1",
    },
    ModuleTerm {
        keywords: &["搜索", "search", "elasticsearch"],
        id: "search",
        name: "Search Service",
        kind: ModuleKind::Service,
        technology: "Elasticsearch",
        color: "#722ed1",
    },
    ModuleTerm {
        keywords: &["消息", "队列", "queue", "kafka", "rabbitmq"],
        id: "queue",
        name: "Message Queue",
        kind: ModuleKind::Queue,
        technology: "RabbitMQ",
        color: "#13c2c2",
    },
    ModuleTerm {
        keywords: &["数据库", "database", "mysql", "postgres", "sql"],
        id: "db",
        name: "Primary Database",
        kind: ModuleKind::Database,
        technology: "PostgreSQL",
        color: "#1890ff",
    },
    ModuleTerm {
        keywords: &["缓存", "cache", "redis"],
        id: "cache",
        name: "Cache",
        kind: ModuleKind::Cache,
        technology: "Redis",
        color: "#f5222d",
    },
    ModuleTerm {
        keywords: &["文件", "存储", "storage", "upload", "s3"],
        id: "storage",
        name: "Object Storage",
        kind: ModuleKind::Storage,
        technology: "S3",
        color: "#8c8c8c",
    },
];

/// Whether any keyword occurs in `text` (already lowercased).
pub fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn attributes(items: &[AttributeTerm]) -> Vec<Attribute> {
    items
        .iter()
        .map(|(name, ty, required)| Attribute::new(name, ty, *required))
        .collect()
}

impl ActorTerm {
    pub fn build(&self) -> Actor {
        Actor {
            id: self.id.to_string(),
            name: self.name.to_string(),
            kind: self.kind,
            description: Some(self.description.to_string()),
        }
    }
}

impl UseCaseTerm {
    pub fn build(&self) -> UseCase {
        UseCase {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            preconditions: strings(self.preconditions),
            postconditions: strings(self.postconditions),
            main_flow: strings(self.main_flow),
            priority: self.priority,
        }
    }
}

impl EntityTerm {
    pub fn build(&self) -> Entity {
        Entity {
            id: self.id.to_string(),
            name: self.name.to_string(),
            attributes: attributes(self.attributes),
            methods: self
                .methods
                .iter()
                .map(|(name, params, ret)| Method {
                    name: name.to_string(),
                    parameters: params
                        .iter()
                        .map(|(p, ty)| Parameter {
                            name: p.to_string(),
                            data_type: ty.to_string(),
                        })
                        .collect(),
                    return_type: ret.to_string(),
                    visibility: None,
                })
                .collect(),
            is_aggregate_root: self.aggregate_root,
        }
    }
}

impl ValueObjectTerm {
    pub fn build(&self) -> ValueObject {
        ValueObject {
            id: self.id.to_string(),
            name: self.name.to_string(),
            attributes: attributes(self.attributes),
            invariants: strings(self.invariants),
        }
    }
}

impl TableTerm {
    pub fn build(&self) -> ErEntity {
        ErEntity {
            id: self.table.to_string(),
            name: self.table.to_string(),
            table_name: self.table.to_string(),
            fields: self
                .fields
                .iter()
                .map(|f| ErField {
                    length: f.length,
                    primary_key: f.primary_key,
                    unique: f.unique,
                    nullable: f.nullable,
                    ..ErField::new(f.name, f.data_type)
                })
                .collect(),
        }
    }
}

impl ModuleTerm {
    pub fn build(&self) -> ArchitectureModule {
        ArchitectureModule {
            id: self.id.to_string(),
            name: self.name.to_string(),
            kind: self.kind,
            technology: self.technology.to_string(),
            description: None,
            dependencies: vec![],
            interfaces: vec![],
            status: Status::Proposed,
            color: Some(self.color.to_string()),
        }
    }
}
