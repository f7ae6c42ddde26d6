#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tld_reconciler::parsers::TldCategory;
    use tld_reconciler::pipeline::Snapshot;
    use tld_reconciler::supplemental::{IntegrityViolation, SupplementalData};
    use tld_reconciler::unified::{build_unified_dataset, TldType};

    const TLD_LIST: &[u8] = include_bytes!("fixtures/tlds.txt");
    const BOOTSTRAP: &[u8] = include_bytes!("fixtures/dns.json");
    const ROOT_DB: &[u8] = include_bytes!("fixtures/root-db.html");
    const SUPPLEMENTAL: &str = include_str!("../data/supplemental.json");

    fn snapshot() -> Result<Snapshot> {
        Snapshot::from_sources(TLD_LIST, BOOTSTRAP, ROOT_DB)
    }

    #[test]
    fn test_fixture_sources_parse() -> Result<()> {
        let snapshot = snapshot()?;

        assert_eq!(snapshot.tld_list.len(), 20);
        assert!(snapshot.tld_list.contains(&"xn--kpry57d".to_string()));
        assert_eq!(snapshot.bootstrap_labels.len(), 14);
        assert_eq!(snapshot.bootstrap_records.len(), 12);
        assert_eq!(snapshot.registry_entries.len(), 23);

        // Direction marks around the Arabic label are dropped
        assert!(snapshot.registry_entries.iter().any(|e| e.tld == "السعودية"));

        let fr = snapshot.registry_entries.iter().find(|e| e.tld == "fr").unwrap();
        assert_eq!(
            fr.manager.as_deref(),
            Some("Association Française pour le Nommage Internet en Coopération (A.F.N.I.C.)")
        );
        Ok(())
    }

    #[test]
    fn test_analysis_counts() -> Result<()> {
        let report = snapshot()?.analysis();

        let tld_list = &report.tld_list;
        assert_eq!((tld_list.total, tld_list.country_code, tld_list.generic), (20, 8, 12));
        assert_eq!((tld_list.idn.total, tld_list.idn.country_code, tld_list.idn.generic), (5, 3, 2));
        assert_eq!((tld_list.idn.ascii, tld_list.idn.unicode), (5, 0));

        let bootstrap = &report.bootstrap;
        assert_eq!((bootstrap.total, bootstrap.country_code, bootstrap.generic), (14, 3, 11));
        assert_eq!((bootstrap.idn.total, bootstrap.idn.country_code, bootstrap.idn.ascii), (3, 1, 3));

        let registry = &report.registry;
        assert_eq!((registry.counts.total, registry.counts.country_code), (23, 9));
        assert_eq!((registry.counts.idn.total, registry.counts.idn.unicode), (6, 6));
        assert_eq!((registry.delegated, registry.undelegated), (20, 3));
        assert_eq!((registry.undelegated_country_code, registry.undelegated_generic), (1, 2));
        assert_eq!(registry.by_category[&TldCategory::Generic], 10);
        assert_eq!(registry.by_category[&TldCategory::Test], 1);
        assert_eq!(registry.delegated_by_category[&TldCategory::Test], 0);
        assert_eq!(registry.delegated_by_category.values().sum::<usize>(), registry.delegated);

        for counts in [tld_list, bootstrap, &registry.counts] {
            assert_eq!(counts.total, counts.country_code + counts.generic);
            assert_eq!(counts.idn.total, counts.idn.ascii + counts.idn.unicode);
        }
        Ok(())
    }

    #[test]
    fn test_comparisons() -> Result<()> {
        let snapshot = snapshot()?;

        let bootstrap = snapshot.compare_bootstrap();
        assert_eq!((bootstrap.source_count, bootstrap.registry_count, bootstrap.in_both), (14, 20, 10));
        assert_eq!(bootstrap.only_in_source, vec!["museum", "xn--flw351e", "xn--p1acf", "xn--p1ai"]);
        assert_eq!(bootstrap.only_in_registry[&TldCategory::CountryCode].len(), 6);
        assert_eq!(bootstrap.only_in_registry[&TldCategory::Sponsored], vec!["aero"]);

        // The list spells IDNs as xn--, the registry page in native script
        let tld_list = snapshot.compare_tld_list();
        assert_eq!(tld_list.in_both, 15);
        assert_eq!(tld_list.only_in_source.len(), 5);
        assert_eq!(tld_list.only_in_registry.values().map(Vec::len).sum::<usize>(), 5);
        assert!(!tld_list.only_in_registry.contains_key(&TldCategory::Test));
        Ok(())
    }

    #[test]
    fn test_unified_dataset_from_fixtures() -> Result<()> {
        let supplemental = SupplementalData::from_json(SUPPLEMENTAL)?;
        let dataset = snapshot()?.unified(&supplemental);

        assert_eq!(dataset.tld_count(), 20);
        assert_eq!(dataset.services.len(), 14);

        let uncovered = dataset.uncovered().expect("fixture has TLDs without RDAP service");
        let labels: Vec<&str> = uncovered.tlds.iter().map(|e| e.tld.as_str()).collect();
        assert_eq!(labels, vec!["aero", "arpa", "xn--kpry57d", "xn--mgberp4a5d4ar"]);

        let (taiwan, _) = dataset.find("台灣").unwrap();
        assert_eq!(taiwan.tld, "xn--kpry57d");
        assert_eq!(taiwan.tld_type, TldType::Cctld);
        assert!(taiwan.tags.is_empty());

        let (google, group) = dataset.find("xn--flw351e").unwrap();
        assert_eq!(google.tld_type, TldType::Gtld);
        assert_eq!(google.tags, vec!["generic"]);
        assert_eq!(google.idn.as_ref().unwrap().unicode, "谷歌");
        assert_eq!(group.rdap_servers, vec!["https://pubapi.registry.google/rdap/"]);
        assert_eq!(group.tlds.len(), 2);

        // Manual servers fill ccTLD gaps and share a group when identical
        let (_, switch) = dataset.find("li").unwrap();
        let switch_labels: Vec<&str> = switch.tlds.iter().map(|e| e.tld.as_str()).collect();
        assert_eq!(switch_labels, vec!["ch", "li"]);
        assert_eq!(switch.rdap_servers, vec!["https://rdap.nic.ch/"]);
        assert_eq!(dataset.find("de").unwrap().1.rdap_servers, vec!["https://rdap.denic.de/"]);

        // Undelegated rows and unknown bootstrap labels never appear
        assert!(dataset.find("bl").is_none());
        assert!(dataset.find("museum").is_none());
        Ok(())
    }

    #[test]
    fn test_snapshot_build_matches_raw_build() -> Result<()> {
        let supplemental = SupplementalData::from_json(SUPPLEMENTAL)?;
        let document: serde_json::Value = serde_json::from_slice(BOOTSTRAP)?;
        let services = document["services"].as_array().cloned().unwrap_or_default();

        let from_snapshot = snapshot()?.unified(&supplemental);
        let from_raw = build_unified_dataset(
            &services,
            &String::from_utf8_lossy(ROOT_DB),
            &supplemental.cc_tld_rdap_servers,
        );
        assert_eq!(from_snapshot.services, from_raw.services);
        Ok(())
    }

    #[test]
    fn test_shipped_supplemental_data_is_consistent() -> Result<()> {
        let supplemental = SupplementalData::from_json(SUPPLEMENTAL)?;
        let snapshot = snapshot()?;

        assert_eq!(supplemental.cc_tld_rdap_servers.len(), 3);
        let violations = snapshot.integrity(&supplemental);
        assert!(violations.is_empty(), "unexpected violations: {:?}", violations);
        Ok(())
    }

    #[test]
    fn test_integrity_violations() -> Result<()> {
        let supplemental = SupplementalData::from_json(
            r#"{
                "ccTldRdapServers": [
                    {"tld": "com", "rdapServer": "https://rdap.example/", "backendOperator": "x", "dateUpdated": "2024-01-01"},
                    {"tld": "fr", "rdapServer": "https://rdap.example/", "backendOperator": "x", "dateUpdated": "2024-01-01"},
                    {"tld": "xx", "rdapServer": "https://rdap.example/", "backendOperator": "x", "dateUpdated": "2024-01-01"}
                ],
                "managerAliases": {"Ghost": [{"name": "Nonexistent Registry"}]}
            }"#,
        )?;

        let violations = snapshot()?.integrity(&supplemental);
        assert_eq!(violations.len(), 5);
        assert!(violations.contains(&IntegrityViolation::OverrideNotCountryCode { tld: "com".to_string() }));
        assert!(violations.contains(&IntegrityViolation::OverrideShadowsBootstrap { tld: "fr".to_string() }));
        assert!(violations.contains(&IntegrityViolation::UnknownOverrideLabel { tld: "xx".to_string() }));
        assert!(violations.contains(&IntegrityViolation::UnknownManager {
            alias: "Ghost".to_string(),
            manager: "Nonexistent Registry".to_string(),
        }));
        Ok(())
    }
}
