use chrono::NaiveDate;

use crate::engine::Router;
use crate::table::{CalCard, Order, Table};
use crate::{Options, rules};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A small table exercising every field the rules touch.
fn fixture() -> Table {
    let mut paper = Order::new(day(2014, 7, 15));
    paper.requisition_number = Some("REQ-001".to_string());
    paper.purchase_order_number = Some("PO-1001".to_string());
    paper.supplier_code = Some("1001".to_string());
    paper.supplier_name = Some("acme supply co".to_string());
    paper.supplier_qualifications = Some("SB".to_string());
    paper.supplier_zip = Some("94203".to_string());
    paper.calcard = CalCard::No;
    paper.lpa_number = Some("LPA-77".to_string());
    paper.item_name = Some("Copy Paper".to_string());
    paper.item_description = Some("Letter size paper".to_string());
    paper.quantity = Some(10.0);
    paper.unit_price = Some(5.0);
    paper.total_price = Some(50.0);
    paper.fiscal_year = Some("2014-2015".to_string());
    paper.acquisition_type = Some("Non-IT Goods".to_string());
    paper.acquisition_method = Some("Informal Competitive".to_string());
    paper.sub_acquisition_method = Some("Fair And Reasonable".to_string());
    paper.department_name = Some("Education".to_string());
    paper.location = Some("90210".to_string());
    paper.classification_codes = Some("14111".to_string());
    paper.normalized_unspsc = Some("14111507".to_string());
    paper.commodity_title = Some("Printing paper".to_string());
    paper.class_title = Some("Office supplies".to_string());
    paper.family_title = Some("Paper products".to_string());
    paper.segment_title = Some("Office Equipment".to_string());

    let mut pens = Order::new(day(2014, 3, 2));
    pens.requisition_number = Some("REQ-002".to_string());
    pens.purchase_order_number = Some("PO-1002".to_string());
    pens.supplier_code = Some("1001".to_string());
    pens.supplier_name = Some("acme supply co".to_string());
    pens.supplier_qualifications = Some("SB".to_string());
    pens.supplier_zip = Some("94203".to_string());
    pens.calcard = CalCard::Yes;
    pens.item_name = Some("Ball Pens".to_string());
    pens.item_description = Some("Blue ballpoint pens".to_string());
    pens.quantity = Some(100.0);
    pens.unit_price = Some(1.0);
    pens.total_price = Some(100.0);
    pens.fiscal_year = Some("2013-2014".to_string());
    pens.acquisition_type = Some("Non-IT Goods".to_string());
    pens.acquisition_method = Some("Informal Competitive".to_string());
    pens.department_name = Some("Education".to_string());
    pens.location = Some("90210".to_string());
    pens.class_title = Some("Office supplies".to_string());
    pens.family_title = Some("Writing instruments".to_string());
    pens.segment_title = Some("Office Equipment".to_string());

    let mut reams = Order::new(day(2013, 11, 20));
    reams.supplier_name = Some("globex corporation".to_string());
    reams.supplier_zip = Some("95814".to_string());
    reams.calcard = CalCard::No;
    reams.item_name = Some("Copy Paper".to_string());
    reams.quantity = Some(40.0);
    reams.total_price = Some(200.0);
    reams.fiscal_year = Some("2013-2014".to_string());
    reams.acquisition_type = Some("Non-IT Goods".to_string());
    reams.acquisition_method = Some("Formal Competitive".to_string());
    reams.department_name = Some("Health Services".to_string());
    reams.location = Some("95814".to_string());
    reams.class_title = Some("Office supplies".to_string());
    reams.segment_title = Some("Office Equipment".to_string());

    let mut laptop = Order::new(day(2012, 1, 5));
    laptop.requisition_number = Some("REQ777".to_string());
    laptop.purchase_order_number = Some("PO-2002".to_string());
    laptop.supplier_code = Some("2002".to_string());
    laptop.supplier_name = Some("initech llc".to_string());
    laptop.supplier_qualifications = Some("DVBE".to_string());
    laptop.supplier_zip = Some("90001".to_string());
    laptop.lpa_number = Some("LPA-99".to_string());
    laptop.item_name = Some("Laptop Computer".to_string());
    laptop.item_description = Some("Dell laptop".to_string());
    laptop.quantity = Some(2.0);
    laptop.unit_price = Some(600.0);
    laptop.total_price = Some(1200.0);
    laptop.fiscal_year = Some("2011-2012".to_string());
    laptop.acquisition_type = Some("IT Goods".to_string());
    laptop.acquisition_method = Some("Statewide Contract".to_string());
    laptop.department_name = Some("Technology".to_string());
    laptop.location = Some("90001".to_string());
    laptop.classification_codes = Some("43211".to_string());
    laptop.normalized_unspsc = Some("43211503".to_string());
    laptop.segment_title = Some("Information Technology".to_string());

    // A row with a missing total: it must never enter sums as zero revenue
    // for its supplier, but still counts as an order.
    let mut toner = Order::new(day(2015, 9, 9));
    toner.supplier_name = Some("globex corporation".to_string());
    toner.supplier_zip = Some("95814".to_string());
    toner.item_name = Some("Toner Cartridge".to_string());
    toner.quantity = Some(5.0);
    toner.fiscal_year = Some("2015-2016".to_string());
    toner.location = Some("95814".to_string());

    Table::from_rows(vec![paper, pens, reams, laptop, toner])
}

fn answer(question: &str) -> String {
    let router = Router::new(rules::all());
    router.route(question, &fixture(), &Options::default()).answer
}

fn matched_rule(question: &str) -> Option<&'static str> {
    let router = Router::new(rules::all());
    router.route(question, &fixture(), &Options::default()).matched_rule
}

#[test]
fn question_examples_route_to_the_expected_answers() {
    // (question, expected answer)
    let exact: Vec<(&str, String)> = vec![
        (
            "how many purchases used the informal competitive acquisition method in 2014?",
            "📦 Number of informal competitive purchases in 2014: 2".to_string(),
        ),
        (
            "how many purchases used the formal competitive acquisition method?",
            "📦 Total formal competitive purchases: 1".to_string(),
        ),
        (
            "top 2 suppliers by total spend",
            "🏆 Top 2 suppliers overall:\n1. Initech Llc: $1,200.00\n2. Globex Corporation: $200.00"
                .to_string(),
        ),
        (
            "top 2 suppliers by total spend in 2014",
            "🏆 Top 2 suppliers in 2014:\n1. Acme Supply Co: $150.00".to_string(),
        ),
        (
            "what is the total spend for supplier code 1001?",
            "🏢 Total spend for supplier code 1001 (acme supply co): $150.00\n- Number of purchases: 2"
                .to_string(),
        ),
        (
            "which acquisition type had the highest spend in 2012?",
            "📊 Highest spending acquisition type in 2012:\n- IT Goods: $1,200.00".to_string(),
        ),
        (
            "what is the normalized unspsc for laptop computer?",
            "🏷️ Normalized UNSPSC for LAPTOP COMPUTER: 43211503".to_string(),
        ),
        (
            "transactions with sub-acquisition method fair and reasonable",
            "📝 Transactions with sub-acquisition method 'fair and reasonable':\n- Copy Paper ($50.00)"
                .to_string(),
        ),
        (
            "segment and family classification of the ball pens",
            "🏷️ Classification for BALL PENS:\n- Segment: Office Equipment\n- Family: Writing instruments"
                .to_string(),
        ),
        (
            "how many items of 43211 bought in 2012?",
            "📦 Total quantity of items with code 43211 in 2012: 2".to_string(),
        ),
        (
            "total spend for the department education in fiscal year 2015",
            "🏛️ Total spend for Education in FY2015: $50.00".to_string(),
        ),
        (
            "purchases linked to location 95814",
            "📍 Purchases for location 95814:\n- Copy Paper ($200.00)\n- Toner Cartridge ($0.00)"
                .to_string(),
        ),
        (
            "total price for all purchases under supplier code 2002",
            "🏢 Total spend for supplier code 2002 (initech llc): $1,200.00\n- Number of purchases: 1"
                .to_string(),
        ),
        (
            // Substring matching is deliberately loose: "it goods" also
            // matches "Non-IT Goods".
            "list all items purchased under the acquisition type it goods",
            "📋 Items purchased under it goods:\n- Copy Paper (Letter size paper)\n- Ball Pens (Blue ballpoint pens)\n- Copy Paper (N/A)\n- Laptop Computer (Dell laptop)"
                .to_string(),
        ),
        (
            "quantity and unit price for the item ball pens in purchase order po-1002",
            "📊 For item BALL PENS in PO po-1002:\n- Quantity: 100\n- Unit Price: $1.00".to_string(),
        ),
        (
            "how many purchases were made using the acquisition method statewide contract",
            "📦 Number of purchases using statewide contract: **1**".to_string(),
        ),
        (
            "total spend by globex in the fiscal year 2013",
            "💸 Total spend by Globex in FY2013: **$200.00**".to_string(),
        ),
        (
            "calcard spending in fiscal year 2014",
            "💳 Total CalCard spending in FY2014: **$100.00**".to_string(),
        ),
        (
            "how many items were purchased from acme using lpa number lpa-77",
            "📦 Items purchased from Acme under LPA lpa-77: **1**".to_string(),
        ),
        (
            "what acquisition methods were used in 2013?",
            "📝 Acquisition methods used in 2013:\n- Formal Competitive: 1".to_string(),
        ),
        (
            "what is the purchase order number for requisition req777?",
            "🔢 Purchase Order Number for Requisition REQ777: **PO-2002**".to_string(),
        ),
        (
            "what is the purchase order number for requisition missing1?",
            "⚠️ No order found for requisition MISSING1".to_string(),
        ),
        (
            "total orders from globex in 2013 and 2014",
            "📦 Orders from Globex:\n- 2013: 1 orders\n- 2014: 0 orders".to_string(),
        ),
        (
            "total quantity of copy paper purchased in 2014",
            "📦 Total quantity of copy paper purchased in 2014: **10**".to_string(),
        ),
        (
            "how many orders from acme in 2014",
            "📦 Orders from Acme in 2014: **2**".to_string(),
        ),
        (
            "total price of copy paper purchased in 2014",
            "💸 Total spending on copy paper in 2014: **$50.00**\n(Example item: Copy Paper)"
                .to_string(),
        ),
        (
            "total spending on copy paper in 2014",
            "💸 Total spending on Copy Paper in 2014: **$50.00**".to_string(),
        ),
        (
            "how much did we spend on ball pens in 2014",
            "💸 Total spending on Ball Pens in 2014: **$100.00**".to_string(),
        ),
        (
            "total calcard spending in 2014",
            "💳 Total CalCard spending in 2014: **$100.00**".to_string(),
        ),
        (
            "what was the most expensive item purchased?",
            "💎 Most expensive item purchased: **Laptop Computer**\n- Price: **$1,200.00**\n- Supplier: Initech Llc\n- Date: 01/05/2012"
                .to_string(),
        ),
        (
            "how many orders between july 2014 and september 2015?",
            "📅 Orders between Jul 2014 and Sep 2015: **2**".to_string(),
        ),
        (
            "list suppliers from zip 94203",
            "🏢 Suppliers from ZIP 94203:\n\n- Acme Supply Co\n\n(Showing 1 of 1 total suppliers)"
                .to_string(),
        ),
        (
            "suppliers with dvbe qualification",
            "🏢 Suppliers with DVBE qualification:\n\n- Initech Llc\n\n(Showing 1 of 1 total suppliers)"
                .to_string(),
        ),
        (
            "what is the most common delivery location?",
            "📍 Most common delivery location: **90210** (2 orders)".to_string(),
        ),
        (
            "give me all suppliers",
            "🏢 List of Suppliers:\n\n- Acme Supply Co\n- Globex Corporation\n- Initech Llc\n\n(Showing 3 of 3 total suppliers)"
                .to_string(),
        ),
        ("total orders from initech", "📦 Total orders from Initech: **1**".to_string()),
        (
            "orders placed on july 15, 2014",
            "📅 Total orders on July 15, 2014: **1**".to_string(),
        ),
        (
            "how many orders in november 2013",
            "📦 Total orders in November 2013: **1**".to_string(),
        ),
        (
            "how many orders were placed in 2013 and 2014?",
            "📊 Total orders by year:\n\n📦 2013: 1 orders\n📦 2014: 2 orders".to_string(),
        ),
        ("how many orders were placed in 2014?", "📦 Total orders in 2014: **2**".to_string()),
        (
            "which quarter had the highest spending in 2014?",
            "💰 Quarter with highest spending in 2014: **Q1 ($100.00)**".to_string(),
        ),
        (
            "orders from suppliers in zip 94203",
            "📦 Orders from suppliers in ZIP 94203: **2**".to_string(),
        ),
        ("orders delivered to 95814", "📦 Orders delivered to 95814: **2**".to_string()),
        (
            "orders with classification code 43211",
            "📦 Orders with classification code 43211: **1**".to_string(),
        ),
        (
            "orders under office supplies category",
            "📦 Total orders under 'office supplies' category: **3**".to_string(),
        ),
        (
            "orders under interplanetary logistics category",
            "❌ No orders found under the category 'interplanetary logistics'.".to_string(),
        ),
        (
            "how many orders did globex corporation make?",
            "📦 Globex Corporation made **2** orders.".to_string(),
        ),
        (
            "total spend by acme supply",
            "💸 Total spend by acme supply co: **$150.00**".to_string(),
        ),
        (
            "orders using formal competitive method",
            "⚙️ Total orders using **formal competitive method**: **1**".to_string(),
        ),
        (
            "what was the total spending in 2014?",
            "💸 Total spending in 2014: **$150.00**".to_string(),
        ),
        (
            "average monthly spending of 2013 and 2014",
            "📈 Average Monthly Spending:\n\n📊 2013: **$16.67**\n📊 2014: **$12.50**".to_string(),
        ),
        (
            "which quarter with the highest spending overall?",
            "💰 Quarter with highest spending: **Q1 ($1,300.00)**".to_string(),
        ),
        (
            "total spending on globex corporation",
            "💸 Total spending on globex corporation: **$200.00**".to_string(),
        ),
        (
            "which supplier had the most orders?",
            "🏢 Supplier with most orders: **acme supply co** (2 orders)".to_string(),
        ),
        (
            "show me spending by supplier",
            "🏢 Top 5 suppliers by total spending:\n\n- initech llc: $1,200.00\n- globex corporation: $200.00\n- acme supply co: $150.00"
                .to_string(),
        ),
        (
            "what is the most common class?",
            "📚 Most common class: **Office supplies** (3 orders)".to_string(),
        ),
        (
            "top segments?",
            "📦 Top 5 segments:\n\n- Office Equipment (3)\n- Information Technology (1)".to_string(),
        ),
        (
            "how much did we spend on ball pens?",
            "💸 Total spending on Ball Pens: **$100.00**".to_string(),
        ),
        (
            "orders in the office equipment segment?",
            "📦 Orders in the 'office equipment' segment: **3**".to_string(),
        ),
        (
            "who is the most expensive supplier?",
            "💸 Most expensive supplier: **initech llc** ($1,200.00)".to_string(),
        ),
        (
            "orders placed with globex corporation in 2013",
            "📦 Orders from Globex Corporation in 2013: **1**".to_string(),
        ),
        (
            "how many orders from globex corporation?",
            "📦 Orders from Globex Corporation: **2**".to_string(),
        ),
        (
            "top 3 items",
            "🛒 Top 3 most bought items:\n\n- Copy Paper (2)\n- Ball Pens (1)\n- Laptop Computer (1)"
                .to_string(),
        ),
    ];

    for (question, expected) in exact {
        assert_eq!(answer(question), expected, "question: {question}");
    }
}

#[test]
fn zip_listing_searches_location_and_supplier_zip() {
    let text = answer("purchases in zip code 90210");
    assert!(text.starts_with("📍 Purchases for location 90210:"), "{text}");
    assert!(text.contains("- Copy Paper ($50.00, 2014-07-15)"), "{text}");
    assert!(text.contains("- Ball Pens ($100.00, 2014-03-02)"), "{text}");

    assert_eq!(answer("purchases in zip code 99999"), "⚠️ No purchases found for ZIP code 99999");
}

#[test]
fn qualification_listing_title_cases_suppliers() {
    let text = answer("purchases from suppliers with the qualification sb");
    assert!(text.starts_with("🏢 Purchases from suppliers with SB qualification:"), "{text}");
    assert!(text.contains("- Acme Supply Co (Copy Paper)"), "{text}");
}

#[test]
fn frequent_item_rankings_break_ties_by_first_encounter() {
    let text = answer("what is the most frequent item?");
    assert_eq!(
        text,
        "🛒 Top 5 most frequently purchased items:\n\n- Copy Paper (2)\n- Ball Pens (1)\n- Laptop Computer (1)\n- Toner Cartridge (1)",
    );

    let bought = answer("what items were bought the most?");
    assert!(bought.starts_with("🛒 Top 5 most frequently bought items:"), "{bought}");
}

#[test]
fn fiscal_year_is_matched_by_substring_not_parsed() {
    // "2014" appears in both the 2013-2014 and 2014-2015 fiscal strings.
    let text = answer("most frequently purchased items in fiscal year 2014");
    assert_eq!(
        text,
        "🛒 Most frequently purchased items in FY2014:\n- Copy Paper (2)\n- Ball Pens (1)",
    );
}

#[test]
fn order_number_lookup_prefers_exact_requisition_matches() {
    let text = answer("show me details for po number po-1001");
    assert!(text.starts_with("📄 **Order Details**"), "{text}");
    assert!(text.contains("- PO #: PO-1001"), "{text}");
    assert!(text.contains("- Supplier: Acme Supply Co"), "{text}");
    assert!(text.contains("- Date: 07/15/2014"), "{text}");

    assert_eq!(
        answer("show me details for po number zz-404"),
        "⚠️ No order found with number ZZ-404",
    );
}

#[test]
fn specific_rules_outrank_general_year_counts() {
    assert_eq!(matched_rule("top 3 suppliers by total spend in 2014"), Some("top N suppliers by total spend"));
    assert_eq!(matched_rule("how many orders were placed in 2014?"), Some("order count in a year"));
    assert_eq!(matched_rule("total spending on copy paper in 2014"), Some("item spend in a year"));
    assert_eq!(matched_rule("total spending on globex corporation"), Some("total spending on a supplier"));
}

#[test]
fn month_words_that_are_not_months_fall_through() {
    // "orders delivered to" is a trigger phrase for the ZIP-listing rule, but
    // its pattern needs a zip/location keyword; the count rule catches it.
    assert_eq!(matched_rule("orders delivered to 95814"), Some("orders delivered to a ZIP"));
    // "in widgetco 2014" captures a non-month word; the month rule declines,
    // and no later rule matches the phrasing either.
    assert_eq!(matched_rule("how many orders were placed in widgetco 2014"), None);
}
