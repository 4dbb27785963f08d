#![allow(dead_code)]

use car_scout::{FieldPolicy, RetryPolicy, RiyasewanaScraper, ScrapeOptions};
use std::time::Duration;

pub struct Item<'a> {
    pub title: &'a str,
    pub href: String,
    pub image: &'a str,
    pub location: &'a str,
    pub price: &'a str,
    pub mileage: &'a str,
}

impl<'a> Item<'a> {
    pub fn new(title: &'a str, href: String) -> Self {
        Self {
            title,
            href,
            image: "//riyasewana.com/uploads/ist.jpg",
            location: "Kandy",
            price: "Rs. 5,650,000",
            mileage: "98000 (km)",
        }
    }
}

pub fn listing_page(items: &[Item]) -> String {
    let cards: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<li class="item round">
                  <h2 class="more"><a href="{href}" title="{title}">{title}</a></h2>
                  <div class="imgbox"><a href="{href}"><img src="{image}" alt="{title}"></a></div>
                  <div class="boxtext">
                    <div class="boxintxt">{location}</div>
                    <div class="boxintxt b">{price}</div>
                    <div class="boxintxt">{mileage}</div>
                    <div class="boxintxt s">2023-09-14</div>
                  </div>
                </li>"#,
                href = item.href,
                title = item.title,
                image = item.image,
                location = item.location,
                price = item.price,
                mileage = item.mileage,
            )
        })
        .collect();

    format!(r#"<html><body><div id="content"><ul>{}</ul></div></body></html>"#, cards)
}

pub const DETAIL_LABELS: [(&str, &str); 10] = [
    ("Make", "Toyota"),
    ("Model", "IST"),
    ("YOM", "2007"),
    ("Mileage (km)", "98,000"),
    ("Gear", "Automatic"),
    ("Fuel Type", "Petrol"),
    ("Options", "AIR CONDITION, POWER STEERING"),
    ("Engine (cc)", "1300"),
    ("Details", "Excellent condition"),
    ("Contact", "077 123 4567"),
];

pub fn detail_page() -> String {
    detail_page_without(&[])
}

pub fn detail_page_without(skip: &[&str]) -> String {
    let rows: String = DETAIL_LABELS
        .iter()
        .filter(|(label, _)| !skip.contains(label))
        .map(|(label, value)| format!("<tr><td class=\"ftin\">{}</td><td> {} </td></tr>", label, value))
        .collect();

    format!(
        r#"<html><body><h1>Toyota IST 2007</h1><table class="moret">{}</table></body></html>"#,
        rows
    )
}

pub fn scraper(field_policy: FieldPolicy) -> RiyasewanaScraper {
    scraper_with_retry(field_policy, RetryPolicy::none())
}

pub fn scraper_with_retry(field_policy: FieldPolicy, retry: RetryPolicy) -> RiyasewanaScraper {
    RiyasewanaScraper::with_options(ScrapeOptions {
        field_policy,
        retry,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}
