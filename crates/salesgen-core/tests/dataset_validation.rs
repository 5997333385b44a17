use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesgen_core::{
    Customer, CustomerId, Error, NormalizedEmail, Product, Sale, validate_dataset,
};

fn products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "iPhone 13".to_string(),
            category: "Celulares".to_string(),
            unit_price: Decimal::from_str("850.00").unwrap(),
        },
        Product {
            id: 2,
            name: "Capa de Silicone".to_string(),
            category: "Acessórios".to_string(),
            unit_price: Decimal::from_str("15.00").unwrap(),
        },
    ]
}

fn customer(id: i64, email: &str) -> Customer {
    Customer {
        id: CustomerId::Numeric(id),
        name: "Maria Silva".to_string(),
        email: NormalizedEmail::parse(email).unwrap(),
        country: "Brasil".to_string(),
        state: "São Paulo".to_string(),
        city: "Campinas".to_string(),
    }
}

fn sale(id: u64, customer_id: i64, product: &Product, quantity: u32) -> Sale {
    let timestamp = NaiveDate::from_ymd_opt(2022, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    Sale::new(
        id,
        timestamp,
        CustomerId::Numeric(customer_id),
        product,
        quantity,
    )
}

#[test]
fn accepts_consistent_dataset() {
    let products = products();
    let customers = vec![
        customer(1, "maria.silva@gmail.com"),
        customer(2, "joao.souza@outlook.com"),
    ];
    let sales = vec![
        sale(1, 1, &products[0], 2),
        sale(2, 2, &products[1], 5),
        sale(3, 1, &products[1], 1),
    ];

    validate_dataset(&products, &customers, &sales).expect("dataset should be valid");
}

#[test]
fn rejects_dangling_customer_reference() {
    let products = products();
    let customers = vec![customer(1, "maria.silva@gmail.com")];
    let sales = vec![sale(1, 99, &products[0], 1)];

    let err = validate_dataset(&products, &customers, &sales).unwrap_err();
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("unknown customer")));
}

#[test]
fn rejects_duplicate_email() {
    let products = products();
    let customers = vec![
        customer(1, "maria.silva@gmail.com"),
        customer(2, "MARIA.SILVA@gmail.com"),
    ];

    let err = validate_dataset(&products, &customers, &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("duplicate customer email")));
}

#[test]
fn rejects_tampered_total() {
    let products = products();
    let customers = vec![customer(1, "maria.silva@gmail.com")];
    let mut tampered = sale(1, 1, &products[0], 2);
    tampered.total = Decimal::from_str("1699.99").unwrap();

    let err = validate_dataset(&products, &customers, &[tampered]).unwrap_err();
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("total")));
}

#[test]
fn rejects_out_of_order_sale_ids() {
    let products = products();
    let customers = vec![customer(1, "maria.silva@gmail.com")];
    let sales = vec![sale(2, 1, &products[0], 1), sale(1, 1, &products[0], 1)];

    assert!(validate_dataset(&products, &customers, &sales).is_err());
}

#[test]
fn serializes_sale_columns_in_contract_order() {
    let products = products();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .serialize(sale(7, 42, &products[1], 3))
        .expect("serialize sale");
    let bytes = writer.into_inner().expect("flush csv");
    let text = String::from_utf8(bytes).expect("utf8");

    assert_eq!(
        text,
        "id,timestamp,customer_id,product_id,quantity,total\n7,2022-03-01T10:00:00,42,2,3,45.00\n"
    );
}
