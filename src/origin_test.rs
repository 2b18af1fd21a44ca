use super::*;

const SITE: &str = "resentencing.netlify.app";

fn local_and_site() -> AllowedOriginSet {
    AllowedOriginSet::list(["http://localhost:5173", "http://127.0.0.1:5173"]).with_site_host(SITE)
}

mod origin_matcher {
    use super::*;

    mod exact {
        use super::*;

        #[test]
        fn should_match_when_origin_is_identical() {
            // Arrange
            let matcher = OriginMatcher::exact("http://localhost:5173");

            // Act & Assert
            assert!(matcher.matches("http://localhost:5173"));
        }

        #[test]
        fn should_not_match_when_port_differs() {
            // Arrange
            let matcher = OriginMatcher::exact("http://localhost:5173");

            // Act & Assert
            assert!(!matcher.matches("http://localhost:3000"));
        }

        #[test]
        fn should_not_match_when_only_case_differs() {
            // Arrange
            let matcher = OriginMatcher::exact("http://localhost:5173");

            // Act & Assert
            assert!(!matcher.matches("HTTP://LOCALHOST:5173"));
        }
    }

    mod site_host {
        use super::*;

        #[test]
        fn should_match_when_hostname_equals_site_host() {
            // Arrange
            let matcher = OriginMatcher::site_host(SITE);

            // Act & Assert
            assert!(matcher.matches("https://resentencing.netlify.app"));
        }

        #[test]
        fn should_match_when_hostname_is_preview_alias() {
            // Arrange
            let matcher = OriginMatcher::site_host(SITE);

            // Act & Assert
            assert!(matcher.matches("https://pr-12--resentencing.netlify.app"));
            assert!(matcher.matches("https://my-feature--resentencing.netlify.app"));
        }

        #[test]
        fn should_match_regardless_of_scheme_and_port() {
            // Arrange
            let matcher = OriginMatcher::site_host(SITE);

            // Act & Assert
            assert!(matcher.matches("http://resentencing.netlify.app:8888"));
        }

        #[test]
        fn should_compare_hostname_case_insensitively() {
            // Arrange
            let matcher = OriginMatcher::site_host("Resentencing.Netlify.App");

            // Act & Assert
            assert!(matcher.matches("https://RESENTENCING.netlify.app"));
        }

        #[test]
        fn should_not_match_when_subdomain_lacks_preview_separator() {
            // Arrange
            let matcher = OriginMatcher::site_host(SITE);

            // Act & Assert
            assert!(!matcher.matches("https://evil.resentencing.netlify.app"));
            assert!(!matcher.matches("https://evilresentencing.netlify.app"));
        }

        #[test]
        fn should_not_match_when_site_host_is_only_a_prefix() {
            // Arrange
            let matcher = OriginMatcher::site_host(SITE);

            // Act & Assert
            assert!(!matcher.matches("https://resentencing.netlify.app.evil.example"));
            assert!(!matcher.matches("https://pr-1--resentencing.netlify.app.evil.example"));
        }

        #[test]
        fn should_not_match_when_origin_is_unparseable() {
            // Arrange
            let matcher = OriginMatcher::site_host(SITE);

            // Act & Assert
            assert!(!matcher.matches("resentencing.netlify.app"));
            assert!(!matcher.matches("null"));
        }

        #[test]
        fn should_not_match_anything_when_site_host_is_blank() {
            // Arrange
            let matcher = OriginMatcher::site_host("  ");

            // Act & Assert
            assert!(!matcher.matches("https://--"));
            assert!(!matcher.matches("https://example.com"));
        }
    }

    mod pattern_str {
        use super::*;

        #[test]
        fn should_match_case_insensitively_when_pattern_compiles() {
            // Arrange
            let matcher = OriginMatcher::pattern_str(r"https://[a-z0-9-]+\.example\.com")
                .expect("valid pattern");

            // Act & Assert
            assert!(matcher.matches("https://app.example.com"));
            assert!(matcher.matches("HTTPS://APP.EXAMPLE.COM"));
        }

        #[test]
        fn should_anchor_to_whole_origin() {
            // Arrange
            let matcher =
                OriginMatcher::pattern_str(r"https://app\.example\.com").expect("valid pattern");

            // Act & Assert
            assert!(!matcher.matches("https://app.example.com.evil.test"));
            assert!(!matcher.matches("xhttps://app.example.com"));
        }

        #[test]
        fn should_return_build_error_when_pattern_is_invalid() {
            // Arrange & Act
            let result = OriginMatcher::pattern_str("(unclosed");

            // Assert
            assert!(matches!(result, Err(PatternError::Build(_))));
        }

        #[test]
        fn should_return_too_long_error_when_pattern_exceeds_limit() {
            // Arrange
            let pattern = "a".repeat(MAX_PATTERN_LENGTH + 1);

            // Act
            let result = OriginMatcher::pattern_str(&pattern);

            // Assert
            match result {
                Err(PatternError::TooLong { length, max }) => {
                    assert_eq!(length, MAX_PATTERN_LENGTH + 1);
                    assert_eq!(max, MAX_PATTERN_LENGTH);
                }
                other => panic!("expected too long error, got {other:?}"),
            }
        }
    }
}

mod allowed_origin_set {
    use super::*;

    mod resolve {
        use super::*;

        #[test]
        fn should_return_missing_when_origin_absent() {
            // Arrange
            let origins = local_and_site();

            // Act & Assert
            assert_eq!(origins.resolve(None), OriginDecision::Missing);
        }

        #[test]
        fn should_return_missing_when_origin_empty() {
            // Arrange
            let origins = local_and_site();

            // Act & Assert
            assert_eq!(origins.resolve(Some("")), OriginDecision::Missing);
        }

        #[test]
        fn should_return_allowed_with_origin_as_received_when_member() {
            // Arrange
            let origins = local_and_site();

            // Act
            let decision = origins.resolve(Some("https://pr-3--resentencing.netlify.app"));

            // Assert
            assert_eq!(
                decision,
                OriginDecision::Allowed("https://pr-3--resentencing.netlify.app".into())
            );
            assert_eq!(
                decision.allowed_origin(),
                Some("https://pr-3--resentencing.netlify.app")
            );
        }

        #[test]
        fn should_return_disallowed_when_not_member() {
            // Arrange
            let origins = local_and_site();

            // Act
            let decision = origins.resolve(Some("https://evil.example"));

            // Assert
            assert_eq!(decision, OriginDecision::Disallowed);
            assert_eq!(decision.allowed_origin(), None);
        }

        #[test]
        fn should_return_disallowed_when_origin_exceeds_length_limit() {
            // Arrange
            let origin = format!("http://localhost:5173{}", "a".repeat(MAX_ORIGIN_LENGTH));
            let origins = AllowedOriginSet::list([origin.clone()]);

            // Act & Assert
            assert_eq!(origins.resolve(Some(&origin)), OriginDecision::Disallowed);
        }

        #[test]
        fn should_disallow_everything_when_set_is_empty() {
            // Arrange
            let origins = AllowedOriginSet::new();

            // Act & Assert
            assert!(origins.is_empty());
            assert_eq!(
                origins.resolve(Some("http://localhost:5173")),
                OriginDecision::Disallowed
            );
        }
    }
}

mod is_allowed_origin {
    use super::*;

    #[test]
    fn should_accept_local_dev_origins() {
        let origins = local_and_site();

        assert!(is_allowed_origin(Some("http://localhost:5173"), &origins));
        assert!(is_allowed_origin(Some("http://127.0.0.1:5173"), &origins));
    }

    #[test]
    fn should_reject_absent_or_empty_origin() {
        let origins = local_and_site();

        assert!(!is_allowed_origin(None, &origins));
        assert!(!is_allowed_origin(Some(""), &origins));
    }

    #[test]
    fn should_reject_foreign_origin() {
        let origins = local_and_site();

        assert!(!is_allowed_origin(Some("https://evil.example"), &origins));
    }

    #[test]
    fn should_accept_exact_list_only_when_no_site_host_configured() {
        let origins = AllowedOriginSet::list(["https://resentencing.netlify.app"]);

        assert!(is_allowed_origin(Some("https://resentencing.netlify.app"), &origins));
        assert!(!is_allowed_origin(
            Some("https://pr-1--resentencing.netlify.app"),
            &origins
        ));
    }
}
