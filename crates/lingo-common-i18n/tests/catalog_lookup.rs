//! End-to-end lookups against a catalog in the on-disk format.

use lingo_common_i18n::{
    load_catalog_file, parse_catalog, write_catalog, Context, LookupOptions, Message,
    TranslationCatalog, TranslationStatus, Translator,
};
use proptest::prelude::*;
use std::path::PathBuf;
use test_case::test_case;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data/RedPandaIDE_zh_CN.ts")
}

fn translator() -> Translator {
    Translator::new(&load_catalog_file(fixture()).unwrap())
}

#[test]
fn test_fixture_structure() {
    let catalog = load_catalog_file(fixture()).unwrap();
    assert_eq!(catalog.version, "2.1");
    assert_eq!(catalog.target_language.as_deref(), Some("zh_CN"));

    let about = catalog.context("AboutDialog").unwrap();
    assert_eq!(about.messages.len(), 2);
    let save = &about.messages[1];
    assert_eq!(save.locations[0].file, "../widgets/aboutdialog.ui");
    assert_eq!(save.locations[0].line, Some(36));

    let plural = catalog
        .context("MainWindow")
        .unwrap()
        .messages
        .iter()
        .find(|m| m.numerus)
        .unwrap();
    assert_eq!(plural.numerus_forms, vec!["%n 个文件已修改"]);
    assert_eq!(plural.locations[0].line, Some(155));

    let stats = catalog.stats();
    assert_eq!(stats.contexts, 2);
    assert_eq!(stats.messages, 8);
    assert_eq!(stats.finished, 6);
    assert_eq!(stats.unfinished, 1);
    assert_eq!(stats.untranslated, 1);
    assert_eq!(stats.vanished, 1);
}

#[test_case("AboutDialog", "About", None, "关于" ; "finished")]
#[test_case("AboutDialog", "Save failed.", None, "Save failed." ; "empty unfinished falls back")]
#[test_case("MainWindow", "All files (*.*)", None, "All files (*.*)" ; "vanished is never served")]
#[test_case("MainWindow", "Open", Some("menu"), "打开" ; "disambiguated")]
#[test_case("MainWindow", "Open", None, "开启" ; "without comment")]
#[test_case("MainWindow", "Compile", None, "编译" ; "unfinished with text")]
#[test_case("MainWindow", "Exit", None, "离开" ; "last duplicate wins")]
#[test_case("MainWindow", "About", None, "About" ; "wrong context")]
#[test_case("Nowhere", "Nothing", None, "Nothing" ; "unknown")]
fn test_fixture_lookup(context: &str, source: &str, comment: Option<&str>, expected: &str) {
    assert_eq!(translator().lookup(context, source, comment, None), expected);
}

#[test]
fn test_fixture_plural() {
    let translator = translator();
    for n in [0, 1, 2, 42] {
        assert_eq!(
            translator.lookup("MainWindow", "%n file(s) modified", None, Some(n)),
            format!("{n} 个文件已修改")
        );
    }
}

#[test]
fn test_fixture_excluding_unfinished() {
    let options = LookupOptions {
        include_unfinished: false,
        ..LookupOptions::default()
    };
    let translator = Translator::with_options(&load_catalog_file(fixture()).unwrap(), options);
    assert_eq!(translator.tr("MainWindow", "Compile"), "Compile");
    assert_eq!(translator.tr("AboutDialog", "About"), "关于");
    assert_eq!(translator.len(), 5);
}

#[test]
fn test_fixture_rewrite_preserves_lookups() {
    let catalog = load_catalog_file(fixture()).unwrap();
    let rewritten = parse_catalog(write_catalog(&catalog).unwrap().as_bytes()).unwrap();
    assert_eq!(rewritten, catalog);

    let before = Translator::new(&catalog);
    let after = Translator::new(&rewritten);
    assert_eq!(before.len(), after.len());
    assert_eq!(after.tr("AboutDialog", "About"), "关于");
}

#[test]
fn test_retired_entry_does_not_shadow_live_one() {
    let catalog = TranslationCatalog::new("zh_CN").with_context(
        Context::new("MainWindow")
            .with_message(Message::new("Run", "运行"))
            .with_message(Message::new("Run", "旧的运行").with_status(TranslationStatus::Obsolete)),
    );
    assert_eq!(Translator::new(&catalog).tr("MainWindow", "Run"), "运行");
}

fn catalog_strategy() -> impl Strategy<Value = TranslationCatalog> {
    // translations may carry control characters, which the writer escapes
    let message = (
        "[A-Za-z ]{1,12}",
        "[a-z]{0,3}",
        "[\\PC\\x00-\\x0c\\x0e-\\x1f]{0,8}",
        0..4u8,
    )
        .prop_map(|(source, comment, translation, status)| {
            let status = match status {
                0 => TranslationStatus::Finished,
                1 => TranslationStatus::Unfinished,
                2 => TranslationStatus::Vanished,
                _ => TranslationStatus::Obsolete,
            };
            Message::new(source, translation)
                .with_comment(comment)
                .with_status(status)
        });
    let context = ("[A-Z][a-z]{0,8}", prop::collection::vec(message, 0..6)).prop_map(
        |(name, messages)| {
            let mut context = Context::new(name);
            for message in messages {
                context.push(message);
            }
            context
        },
    );
    prop::collection::vec(context, 0..4).prop_map(|contexts| {
        let mut catalog = TranslationCatalog::new("zh_CN");
        for context in contexts {
            catalog.push(context);
        }
        catalog
    })
}

proptest! {
    #[test]
    fn prop_lookup_never_serves_retired_or_empty(catalog in catalog_strategy()) {
        let translator = Translator::new(&catalog);
        for (context, message) in catalog.messages() {
            let comment = Some(message.comment.as_str());
            let text = translator.lookup(context, &message.source, comment, None);
            prop_assert!(!text.is_empty());

            // the served text is the translation of the last servable duplicate
            let last_servable = catalog
                .messages()
                .filter(|(c, m)| {
                    *c == context
                        && m.source == message.source
                        && m.comment == message.comment
                        && !m.status.is_retired()
                        && m.has_translation()
                })
                .last()
                .map(|(_, m)| m.translation.as_str());
            prop_assert_eq!(text.as_ref(), last_servable.unwrap_or(message.source.as_str()));
        }
    }

    #[test]
    fn prop_unknown_keys_fall_back_to_source(source in "\\PC{0,20}", context in "[a-z]{1,8}") {
        let translator = translator();
        let text = translator.lookup(&context, &source, None, None);
        prop_assert!(translator.contains(&context, &source, None) || text == source);
    }

    #[test]
    fn prop_written_catalog_parses_back(catalog in catalog_strategy()) {
        let text = write_catalog(&catalog).unwrap();
        prop_assert_eq!(parse_catalog(text.as_bytes()).unwrap(), catalog);
    }
}
