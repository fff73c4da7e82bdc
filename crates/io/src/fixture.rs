// Test databases

use rusqlite::Connection;

pub const SCHEMA: &str = "
CREATE TABLE Customer (customer_id INTEGER PRIMARY KEY, age INTEGER);
CREATE TABLE Sales (sales_id INTEGER PRIMARY KEY, customer_id INTEGER);
CREATE TABLE Orders (order_id INTEGER PRIMARY KEY, sales_id INTEGER, item_id INTEGER, quantity INTEGER);
CREATE TABLE Items (item_id INTEGER PRIMARY KEY, item_name TEXT);
";

pub fn empty_schema() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn
}

/// Three customers in range, one too young, one too old; repeated items,
/// NULL and zero quantities.
pub fn sample() -> Connection {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO Customer VALUES (1, 21), (2, 23), (3, 35), (4, 17), (5, 36);
         INSERT INTO Items VALUES (100, 'x'), (101, 'y'), (102, 'z');
         INSERT INTO Sales VALUES (1, 1), (2, 1), (3, 2), (4, 3), (5, 4), (6, 5);
         INSERT INTO Orders VALUES
            (1, 1, 100, 3),
            (2, 2, 100, 7),
            (3, 1, 101, NULL),
            (4, 3, 100, 1),
            (5, 3, 101, 1),
            (6, 3, 102, 1),
            (7, 4, 102, 0),
            (8, 4, 101, 2),
            (9, 5, 100, 9),
            (10, 6, 100, 9);",
    )
    .unwrap();
    conn
}
