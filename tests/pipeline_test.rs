mod common;

use cocoa_chain::domain::catalog::PRODUCT_NAMES;
use cocoa_chain::domain::commodity::{CommodityKind, LineItem};
use cocoa_chain::domain::money::Money;
use cocoa_chain::domain::participant::{ParticipantId, Role};
use cocoa_chain::domain::ports::{CatalogIndex, RecordStore};
use cocoa_chain::domain::request::Request;
use cocoa_chain::infrastructure::in_memory::InMemoryLedger;
use common::scripted_engine;
use rust_decimal_macros::dec;

async fn balance(ledger: &InMemoryLedger, id: &str) -> Money {
    ledger
        .participant(&ParticipantId::new(id))
        .await
        .unwrap()
        .unwrap()
        .balance
}

async fn total_balance(ledger: &InMemoryLedger) -> Money {
    ledger
        .participants()
        .await
        .unwrap()
        .iter()
        .map(|p| p.balance)
        .sum()
}

#[tokio::test]
async fn test_seed_to_order_walkthrough() {
    // 0.4: batch of 8. Then bean 1 draws name 0, chocolate, markup 50;
    // bean 2 draws name 0 again and only restocks.
    let (ledger, engine) = scripted_engine(
        vec![0.4, 0.0, 0.0, 0.1, 0.0],
        &[
            ("t1", Role::Trader, dec!(0)),
            ("f1", Role::Farmer, dec!(100)),
            ("fa1", Role::Factory, dec!(1000)),
            ("m1", Role::Market, dec!(10000)),
            ("c1", Role::Customer, dec!(10000)),
        ],
    )
    .await;
    let name = PRODUCT_NAMES[0];

    let requests = vec![
        Request::GenerateSeeds {
            trader: "t1".into(),
        },
        Request::TradeSeed {
            trader: "t1".into(),
            farmer: "f1".into(),
            quantity: 3,
        },
        Request::Harvest {
            farmer: "f1".into(),
        },
        Request::TradeBean {
            farmer: "f1".into(),
            factory: "fa1".into(),
            quantity: 2,
        },
        Request::Transformation {
            factory: "fa1".into(),
        },
        Request::TradeProduct {
            factory: "fa1".into(),
            market: "m1".into(),
            records: vec![LineItem::new(name, 1)],
        },
        Request::ProcessOrder {
            market: "m1".into(),
            customer: "c1".into(),
            records: vec![LineItem::new(name, 1)],
        },
    ];
    for request in requests {
        let label = request.name();
        let outcome = engine.process_request(request).await.unwrap();
        assert!(outcome.is_applied(), "{label} was rejected: {outcome:?}");
    }

    assert_eq!(balance(&ledger, "t1").await, Money::new(dec!(30)));
    assert_eq!(balance(&ledger, "f1").await, Money::new(dec!(90)));
    assert_eq!(balance(&ledger, "fa1").await, Money::new(dec!(1480)));
    assert_eq!(balance(&ledger, "m1").await, Money::new(dec!(10100)));
    assert_eq!(balance(&ledger, "c1").await, Money::new(dec!(9400)));

    let factory_product = ledger
        .product_named(&"fa1".into(), name)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(factory_product.price, Money::new(dec!(500)));
    let factory_stock = ledger.stock_of(factory_product.id).await.unwrap().unwrap();
    assert_eq!(factory_stock.quantity, 1);

    let market_product = ledger
        .product_named(&"m1".into(), name)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(market_product.price, Money::new(dec!(600)));
    let market_stock = ledger.stock_of(market_product.id).await.unwrap().unwrap();
    assert_eq!(market_stock.quantity, 0);

    let snapshot = engine.snapshot().await.unwrap();
    let row = |id: &str| {
        snapshot
            .iter()
            .find(|s| s.participant.as_str() == id)
            .unwrap()
            .clone()
    };
    assert_eq!(row("t1").seeds, 5);
    assert_eq!(row("f1").seeds, 0);
    assert_eq!(row("f1").beans, 1);
    assert_eq!(row("f1").harvesters, Some(3));
    assert_eq!(row("fa1").beans, 0);
    assert_eq!(row("fa1").products, 1);
    assert_eq!(row("m1").products, 1);
    assert_eq!(row("c1").orders, 1);
    assert_eq!(row("c1").products, 0);

    let orders = ledger.orders_of(&"c1".into()).await.unwrap();
    assert_eq!(orders[0].total_price, Money::new(dec!(600)));
}

#[tokio::test]
async fn test_accepted_trades_conserve_money() {
    let (ledger, engine) = scripted_engine(
        vec![0.9],
        &[
            ("t1", Role::Trader, dec!(12.5)),
            ("f1", Role::Farmer, dec!(77.25)),
        ],
    )
    .await;
    let before = total_balance(&ledger).await;

    engine
        .process_request(Request::GenerateSeeds {
            trader: "t1".into(),
        })
        .await
        .unwrap();
    for quantity in [1, 4, 2] {
        let outcome = engine
            .process_request(Request::TradeSeed {
                trader: "t1".into(),
                farmer: "f1".into(),
                quantity,
            })
            .await
            .unwrap();
        assert!(outcome.is_applied());
    }

    assert_eq!(total_balance(&ledger).await, before);
    assert_eq!(
        ledger
            .holdings(&"f1".into(), CommodityKind::Seed)
            .await
            .unwrap()
            .len(),
        7
    );
}
