//! Scrape behaviour over a real socket. The only test in this binary that
//! calls `/work`, so counter deltas are exact.

use sample_app::observability::metrics::{
    scrape_counter, DURATION_BUCKETS, REQUESTS_TOTAL, REQUEST_DURATION_SECONDS,
};

mod common;

async fn scrape(client: &reqwest::Client, addr: std::net::SocketAddr) -> String {
    let res = client
        .get(format!("http://{addr}/metrics"))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "text/plain; version=0.0.4"
    );
    res.text().await.unwrap()
}

#[tokio::test]
async fn test_counter_increments_once_per_work_call() {
    let (addr, shutdown, _provider) = common::spawn_server(common::test_config(99)).await;
    let client = common::client();

    for fail in [false, true, true, true] {
        let before = scrape(&client, addr).await;

        let res = client
            .get(format!("http://{addr}/work"))
            .query(&[("fail", fail)])
            .send()
            .await
            .unwrap();
        let status = res.status().as_u16();
        assert!(status == 200 || status == 500);
        if !fail {
            assert_eq!(status, 200);
        }

        let after = scrape(&client, addr).await;
        let labels = |s: &'static str| [("method", "GET"), ("path", "/work"), ("status", s)];
        let (hit, other) = if status == 200 { ("200", "500") } else { ("500", "200") };

        assert_eq!(
            scrape_counter(&after, REQUESTS_TOTAL, &labels(hit))
                - scrape_counter(&before, REQUESTS_TOTAL, &labels(hit)),
            1.0
        );
        assert_eq!(
            scrape_counter(&after, REQUESTS_TOTAL, &labels(other)),
            scrape_counter(&before, REQUESTS_TOTAL, &labels(other)),
        );

        let count = format!("{REQUEST_DURATION_SECONDS}_count");
        assert_eq!(scrape_counter(&after, &count, &[]) - scrape_counter(&before, &count, &[]), 1.0);
        for bucket in DURATION_BUCKETS {
            let series = format!("{REQUEST_DURATION_SECONDS}_bucket{{le=\"{bucket}\"}}");
            assert!(after.contains(&series), "missing {series}");
        }
        assert!(after.contains(&format!("{REQUEST_DURATION_SECONDS}_bucket{{le=\"+Inf\"}}")));
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_healthz_over_the_wire() {
    let (addr, shutdown, _provider) = common::spawn_server(common::test_config(7)).await;

    let res = common::client()
        .get(format!("http://{addr}/healthz"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "status": "ok" }));

    shutdown.trigger();
}
