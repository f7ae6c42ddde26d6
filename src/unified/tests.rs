#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use crate::idn::IdnPair;
    use crate::parsers::{BootstrapRecord, RegistryEntry, TldCategory};
    use crate::supplemental::ManualOverride;
    use crate::unified::builder::{bootstrap_servers, index_delegated};
    use crate::unified::{build_from_records, build_unified_dataset, TldType, UnifiedDataset};

    fn entry(tld: &str, category: TldCategory, manager: Option<&str>) -> RegistryEntry {
        RegistryEntry {
            tld: tld.to_string(),
            category,
            delegated: manager.is_some(),
            manager: manager.map(str::to_string),
        }
    }

    fn record(tlds: &[&str], servers: &[&str]) -> BootstrapRecord {
        BootstrapRecord {
            tlds: tlds.iter().map(|s| s.to_string()).collect(),
            servers: servers.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn manual(tld: &str, server: &str) -> ManualOverride {
        ManualOverride {
            tld: tld.to_string(),
            rdap_server: server.to_string(),
            backend_operator: "Test Operator".to_string(),
            date_updated: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            source: None,
            notes: None,
        }
    }

    fn registry() -> Vec<RegistryEntry> {
        vec![
            entry("com", TldCategory::Generic, Some("VeriSign Global Registry Services")),
            entry("net", TldCategory::Generic, Some("VeriSign Global Registry Services")),
            entry("台灣", TldCategory::CountryCode, Some("Taiwan Network Information Center (TWNIC)")),
            entry("谷歌", TldCategory::Generic, Some("Charleston Road Registry Inc.")),
            entry("de", TldCategory::CountryCode, Some("DENIC eG")),
            entry("aq", TldCategory::CountryCode, Some("Antarctica Network Information Centre Limited")),
            entry("aero", TldCategory::Sponsored, Some("SITA")),
            entry("bl", TldCategory::CountryCode, None),
        ]
    }

    fn build(records: &[BootstrapRecord], overrides: &[ManualOverride]) -> UnifiedDataset {
        let generated = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 5).unwrap();
        build_from_records(records, &registry(), overrides, generated)
    }

    #[test]
    fn test_idn_labels_keep_registry_classification() {
        let dataset = build(
            &[
                record(&["xn--kpry57d"], &["https://ccrdap.twnic.tw/taiwan/"]),
                record(&["xn--flw351e"], &["https://pubapi.registry.google/rdap/"]),
            ],
            &[],
        );

        let (taiwan, group) = dataset.find("xn--kpry57d").unwrap();
        assert_eq!(taiwan.tld_type, TldType::Cctld);
        assert_eq!(taiwan.idn.as_ref().unwrap().unicode, "台灣");
        assert!(taiwan.tags.is_empty());
        assert_eq!(group.rdap_servers, vec!["https://ccrdap.twnic.tw/taiwan/"]);

        let (google, _) = dataset.find("谷歌").unwrap();
        assert_eq!(google.tld, "xn--flw351e");
        assert_eq!(google.tld_type, TldType::Gtld);
        assert_eq!(google.tags, vec!["generic"]);
    }

    #[test]
    fn test_uncovered_tlds_share_empty_group() {
        let dataset = build(&[record(&["com", "net"], &["https://rdap.verisign.com/com/v1/"])], &[]);

        let uncovered = dataset.uncovered().unwrap();
        assert!(uncovered.rdap_servers.is_empty());
        let labels: Vec<&str> = uncovered.tlds.iter().map(|e| e.tld.as_str()).collect();
        assert_eq!(labels, vec!["aero", "aq", "de", "xn--flw351e", "xn--kpry57d"]);
        assert_eq!(dataset.tld_count(), 7);
    }

    #[test]
    fn test_only_delegated_labels_are_included() {
        let dataset = build(
            &[record(&["com", "bl", "example"], &["https://rdap.example/"])],
            &[manual("bl", "https://rdap.bl.example/"), manual("zz", "https://rdap.zz.example/")],
        );
        assert!(dataset.find("bl").is_none());
        assert!(dataset.find("example").is_none());
        assert!(dataset.find("zz").is_none());
        assert!(dataset.find("com").is_some());
    }

    #[test]
    fn test_manual_override_replaces_servers() {
        let dataset = build(
            &[record(&["aq", "com"], &["https://rdap.a/", "https://rdap.b/"])],
            &[manual("de", "https://rdap.denic.de/"), manual("aq", "https://rdap.aq.example/")],
        );

        let (_, de_group) = dataset.find("de").unwrap();
        assert_eq!(de_group.rdap_servers, vec!["https://rdap.denic.de/"]);
        let (_, aq_group) = dataset.find("aq").unwrap();
        assert_eq!(aq_group.rdap_servers, vec!["https://rdap.aq.example/"]);
        let (_, com_group) = dataset.find("com").unwrap();
        assert_eq!(com_group.tlds.len(), 1);
    }

    #[test]
    fn test_manual_override_ignored_for_generic() {
        let dataset = build(&[], &[manual("com", "https://rdap.rogue.example/")]);
        let (_, group) = dataset.find("com").unwrap();
        assert!(group.rdap_servers.is_empty());
    }

    #[test]
    fn test_groups_use_order_insensitive_signature() {
        let dataset = build(
            &[
                record(&["com"], &["https://b.example/", "https://a.example/"]),
                record(&["net"], &["https://a.example/", "https://b.example/"]),
            ],
            &[],
        );
        let (_, group) = dataset.find("net").unwrap();
        let labels: Vec<&str> = group.tlds.iter().map(|e| e.tld.as_str()).collect();
        assert_eq!(labels, vec!["com", "net"]);
        assert_eq!(group.rdap_servers, vec!["https://a.example/", "https://b.example/"]);
    }

    #[test]
    fn test_duplicate_bootstrap_label_last_wins() {
        let dataset = build(
            &[record(&["de"], &["https://first.example/"]), record(&["de"], &["https://second.example/"])],
            &[],
        );
        let (_, group) = dataset.find("de").unwrap();
        assert_eq!(group.rdap_servers, vec!["https://second.example/"]);
    }

    #[test]
    fn test_duplicates_only_across_services() {
        let (_, aliases) = index_delegated(&registry());

        // Repeated inside one service: not a conflict
        let (servers, duplicates) =
            bootstrap_servers(&[record(&["de", "de"], &["https://rdap.denic.de/"])], &aliases);
        assert!(duplicates.is_empty());
        assert_eq!(servers["de"], vec!["https://rdap.denic.de/"]);

        let (servers, duplicates) = bootstrap_servers(
            &[
                record(&["com", "de"], &["https://first.example/"]),
                record(&["de", "台灣"], &["https://second.example/"]),
            ],
            &aliases,
        );
        assert_eq!(duplicates, vec!["de"]);
        assert_eq!(servers["de"], vec!["https://second.example/"]);
        assert_eq!(servers["xn--kpry57d"], vec!["https://second.example/"]);
    }

    #[test]
    fn test_output_is_sorted() {
        let dataset = build(
            &[
                record(&["net", "aero"], &["https://z.example/"]),
                record(&["com"], &["https://a.example/"]),
            ],
            &[],
        );
        for group in &dataset.services {
            let labels: Vec<&String> = group.tlds.iter().map(|e| &e.tld).collect();
            let mut sorted = labels.clone();
            sorted.sort();
            assert_eq!(labels, sorted);
        }
        let firsts: Vec<&String> = dataset.services.iter().map(|g| &g.tlds[0].tld).collect();
        let mut sorted = firsts.clone();
        sorted.sort();
        assert_eq!(firsts, sorted);
    }

    #[test]
    fn test_country_code_tags_always_empty() {
        let dataset = build(&[], &[]);
        for (entry, _) in dataset.entries() {
            match entry.tld_type {
                TldType::Cctld => assert!(entry.tags.is_empty()),
                TldType::Gtld => assert_eq!(entry.tags.len(), 1),
            }
        }
    }

    #[test]
    fn test_idn_pairs_round_trip() {
        let dataset = build(&[], &[]);
        for (entry, _) in dataset.entries() {
            if let Some(pair) = &entry.idn {
                assert_eq!(IdnPair::derive(&pair.ascii).as_ref(), Some(pair));
                assert_eq!(IdnPair::derive(&pair.unicode).as_ref(), Some(pair));
            }
        }
    }

    #[test]
    fn test_json_contract() {
        let dataset = build(&[record(&["com"], &["https://rdap.verisign.com/com/v1/"])], &[]);
        let json = serde_json::to_value(&dataset).unwrap();

        assert_eq!(json["generated"], "2024-06-01T12:30:05Z");
        let first = &json["services"][0];
        assert!(first["rdapServers"].is_array());
        let aero = &first["tlds"][0];
        assert_eq!(aero["tld"], "aero");
        assert_eq!(aero["type"], "gtld");
        assert!(aero["idn"].is_null());
        assert_eq!(aero["tags"], json!(["sponsored"]));
        assert_eq!(aero["manager"], "SITA");
    }

    #[test]
    fn test_build_from_raw_sources() {
        let services = vec![
            json!([["xn--kpry57d"], ["https://ccrdap.twnic.tw/taiwan/"]]),
            json!("garbage"),
        ];
        let html = r#"<table id="tld-table"><tbody>
            <tr><td><a href="/domains/root/db/xn--kpry57d.html">.台灣</a></td><td>country-code</td><td>Taiwan Network Information Center (TWNIC)</td></tr>
            <tr><td><a href="/domains/root/db/xn--flw351e.html">.谷歌</a></td><td>generic</td><td>Charleston Road Registry Inc.</td></tr>
        </tbody></table>"#;

        let dataset = build_unified_dataset(&services, html, &[]);
        assert_eq!(dataset.tld_count(), 2);
        assert_eq!(dataset.generated.len(), "2024-06-01T12:30:05Z".len());
        let (taiwan, _) = dataset.find("xn--kpry57d").unwrap();
        assert_eq!(taiwan.tld_type, TldType::Cctld);
        let (google, group) = dataset.find("xn--flw351e").unwrap();
        assert_eq!(google.tld_type, TldType::Gtld);
        assert!(group.rdap_servers.is_empty());
    }
}
