//! Static descriptions of the tables the store owns. Every table has a `BIGSERIAL id`
//! primary key which is not listed among its columns.

pub struct Column {
    pub name: &'static str,
    pub pg_type: &'static str,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

const fn col(name: &'static str, pg_type: &'static str) -> Column {
    Column { name, pg_type }
}

pub const USERS: Table = Table {
    name: "users",
    columns: &[col("name", "text"), col("age", "integer")],
};

pub const CITIES: Table = Table {
    name: "cities",
    columns: &[
        col("name", "text"),
        col("description", "text"),
        col("image_url", "text"),
    ],
};

pub const TOUR_GUIDES: Table = Table {
    name: "tour_guides",
    columns: &[
        col("name", "text"),
        col("experience_years", "integer"),
        col("bio", "text"),
        col("contact_info", "text"),
        col("city_id", "bigint"),
    ],
};

pub const TRAVELS: Table = Table {
    name: "travels",
    columns: &[
        col("name", "text"),
        col("description", "text"),
        col("price", "double precision"),
        col("duration", "text"),
        col("start_date", "date"),
        col("end_date", "date"),
        col("image_url", "text"),
        col("city_id", "bigint"),
        col("guide_id", "bigint"),
    ],
};

pub const ORDERS: Table = Table {
    name: "orders",
    columns: &[
        col("user_id", "bigint"),
        col("travel_id", "bigint"),
        col("order_date", "timestamptz"),
        col("status", "text"),
    ],
};

pub const REVIEWS: Table = Table {
    name: "reviews",
    columns: &[
        col("user_id", "bigint"),
        col("travel_id", "bigint"),
        col("rating", "integer"),
        col("comment", "text"),
        col("created_at", "timestamptz"),
    ],
};

pub const POSTS: Table = Table {
    name: "posts",
    columns: &[
        col("title", "text"),
        col("text", "text"),
        col("author_id", "bigint"),
    ],
};
