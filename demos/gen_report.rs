//! Generate a wellness report for manual inspection

fn main() {
    let json = r#"{
        "owner_id": "demo-user",
        "reference_time": "2024-01-15T20:00:00Z",
        "samples": [
            { "id": "s1", "owner_id": "demo-user", "metric": "sleep", "value": 6.2, "recorded_at": "2024-01-12T07:00:00Z", "source": "wearable" },
            { "id": "s2", "owner_id": "demo-user", "metric": "sleep", "value": 5.8, "recorded_at": "2024-01-13T07:10:00Z", "source": "wearable" },
            { "id": "t1", "owner_id": "demo-user", "metric": "stress", "value": 7.0, "recorded_at": "2024-01-13T18:00:00Z", "source": "manual" },
            { "id": "m1", "owner_id": "demo-user", "metric": "mood", "value": 4.0, "recorded_at": "2024-01-11T09:00:00Z", "source": "manual" },
            { "id": "m2", "owner_id": "demo-user", "metric": "mood", "value": 5.0, "recorded_at": "2024-01-12T09:00:00Z", "source": "manual" },
            { "id": "m3", "owner_id": "demo-user", "metric": "mood", "value": 6.0, "recorded_at": "2024-01-13T09:00:00Z", "source": "manual" },
            { "id": "m4", "owner_id": "demo-user", "metric": "mood", "value": 7.0, "recorded_at": "2024-01-14T09:00:00Z", "source": "manual" },
            { "id": "h1", "owner_id": "demo-user", "metric": "heart_rate", "value": 68, "unit": "bpm", "recorded_at": "2024-01-14T09:05:00Z", "source": "wearable" }
        ],
        "screeners": [
            { "id": "phq-1", "owner_id": "demo-user", "kind": "phq9", "score": 11, "responses": {}, "risk_level": "moderate", "created_at": "2024-01-02T10:00:00Z" }
        ]
    }"#;

    match wellness_insight::snapshot_to_report(json.to_string()) {
        Ok(report) => print!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
