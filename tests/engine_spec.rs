use pbxproj_patch::models::*;
use pbxproj_patch::pbxproj::{self, Anchors, EngineOptions, GroupIndex, Identifier};
use speculate2::speculate;

const MINIMAL: &str = include_str!("fixtures/minimal.pbxproj");
const MINIMAL_WITH_BIAS: &str = include_str!("fixtures/minimal_bias.pbxproj");
const APP: &str = include_str!("fixtures/app.pbxproj");

const VIEW_MODELS: &str = "4FA228922EC4607B00FCC66B";
const MAIN_GROUP: &str = "4FF2C7D42EC4102800186296";

fn id(s: &str) -> Identifier {
    s.parse().expect("valid identifier")
}

fn bias() -> LogicalFile {
    LogicalFile::new("Bias.swift", "Models", "Models/Bias.swift")
}

fn anchored_after_view_models() -> EngineOptions {
    EngineOptions {
        anchors: Anchors {
            group_anchor: Some(id(VIEW_MODELS)),
            ..Anchors::default()
        },
        ..EngineOptions::default()
    }
}

fn count(document: &str, needle: &str) -> usize {
    document.matches(needle).count()
}

/// Number of groups whose children list `child`.
fn groups_listing(document: &str, child: &Identifier) -> usize {
    GroupIndex::scan(document)
        .iter()
        .filter(|group| group.children.iter().any(|c| &c.id == child))
        .count()
}

/// Assert `file` was added exactly once across all sections.
fn assert_added_once(document: &str, file: &LogicalFile) {
    let entity = pbxproj::synthesize(file);
    let r = entity.reference_id.as_str();
    let b = entity.build_id.as_str();

    assert_eq!(count(document, &format!("{r} /* {} */ = {{isa = PBXFileReference", file.name)), 1);
    assert_eq!(count(document, &format!("fileRef = {r} ")), 1);
    assert_eq!(count(document, &format!("{b} /* {} in Sources */,", file.name)), 1);
    assert_eq!(groups_listing(document, &entity.reference_id), 1);
}

speculate! {
    describe "end to end" {
        it "adds Bias.swift to a new Models group after the ViewModels anchor" {
            let outcome = pbxproj::patch(MINIMAL, &[bias()], &anchored_after_view_models());

            assert_eq!(outcome.document, MINIMAL_WITH_BIAS);
            assert_eq!(outcome.report.references_added, 1);
            assert_eq!(outcome.report.build_files_added, 1);
            assert_eq!(outcome.report.phase_entries_added, 1);
            assert_eq!(outcome.report.groups_created, 1);
            assert_eq!(outcome.report.group_children_added, 0);
            assert!(outcome.report.anchor_misses.is_empty());
        }

        it "links the new group into the root group" {
            let outcome = pbxproj::patch(MINIMAL, &[bias()], &anchored_after_view_models());
            let index = GroupIndex::scan(&outcome.document);
            let models = pbxproj::new_group_id("Models");

            let root = index.get(&id(MAIN_GROUP)).expect("root group");
            assert!(root.children.iter().any(|child| child.id == models));
            assert!(index.unreachable_from(&id(MAIN_GROUP)).is_empty());
            assert!(pbxproj::check(&outcome.document).is_clean());
        }

        it "falls back to the end of the group section without an anchor node" {
            let outcome = pbxproj::patch(MINIMAL, &[bias()], &EngineOptions::default());
            let document = &outcome.document;

            let models_at = document.find("AAC7DC5DCD23638D271D3093 /* Models */ = {").unwrap();
            let root_at = document.find("4FF2C7D42EC4102800186296 = {").unwrap();
            let end_at = document.find("/* End PBXGroup section */").unwrap();
            assert!(root_at < models_at && models_at < end_at);
            assert!(pbxproj::check(document).is_clean());
        }
    }

    describe "existing projects" {
        it "adds each file exactly once across sections" {
            let files = vec![
                LogicalFile::new("AuthService.swift", "Services", "Services/AuthService.swift"),
                LogicalFile::new("TaskService.swift", "Services", "Services/TaskService.swift"),
                bias(),
                LogicalFile::new("BiasViewModel.swift", "ViewModels", "ViewModels/BiasViewModel.swift"),
                LogicalFile::new("LoginView.swift", "KPOPVOTE/Views/Auth", "Views/Auth/LoginView.swift"),
            ];
            let outcome = pbxproj::patch(APP, &files, &EngineOptions::default());

            for file in &files {
                assert_added_once(&outcome.document, file);
            }
            assert_eq!(outcome.report.references_added, 5);
            assert_eq!(outcome.report.groups_created, 3);
            assert_eq!(outcome.report.group_children_added, 1);
            assert!(pbxproj::check(&outcome.document).is_clean());
        }

        it "appends to an existing group instead of creating one" {
            let file = LogicalFile::new("BiasViewModel.swift", "ViewModels", "ViewModels/BiasViewModel.swift");
            let outcome = pbxproj::patch(APP, &[file], &EngineOptions::default());

            let index = GroupIndex::scan(&outcome.document);
            let view_models = index.get(&id(VIEW_MODELS)).unwrap();
            let labels: Vec<_> = view_models
                .children
                .iter()
                .filter_map(|child| child.label.as_deref())
                .collect();
            assert_eq!(labels, vec!["AuthViewModel.swift", "HomeViewModel.swift", "BiasViewModel.swift"]);
            assert_eq!(outcome.report.groups_created, 0);
        }

        it "nests a new group under its deepest existing ancestor" {
            let file = LogicalFile::new("LoginView.swift", "KPOPVOTE/Views", "Views/LoginView.swift");
            let outcome = pbxproj::patch(APP, &[file], &EngineOptions::default());

            let index = GroupIndex::scan(&outcome.document);
            let views = pbxproj::new_group_id("KPOPVOTE/Views");
            let app_group = index.get(&id("4FF2C7DF2EC4102800186296")).unwrap();
            assert!(app_group.children.iter().any(|child| child.id == views));
            assert_eq!(index.get(&views).unwrap().path.as_deref(), Some("Views"));
            assert!(!index.get(&id(MAIN_GROUP)).unwrap().children.iter().any(|child| child.id == views));
        }

        it "nests new groups under groups created in the same run" {
            let files = vec![
                LogicalFile::new("LoginView.swift", "Views/Auth", "Views/Auth/LoginView.swift"),
                LogicalFile::new("HomeView.swift", "Views", "Views/HomeView.swift"),
            ];
            let outcome = pbxproj::patch(APP, &files, &EngineOptions::default());

            let index = GroupIndex::scan(&outcome.document);
            let views = pbxproj::new_group_id("Views");
            let auth = pbxproj::new_group_id("Views/Auth");
            let root = index.get(&id(MAIN_GROUP)).unwrap();
            assert!(root.children.iter().any(|child| child.id == views));
            assert!(!root.children.iter().any(|child| child.id == auth));

            let views_group = index.get(&views).unwrap();
            assert!(views_group.has_child_labelled("HomeView.swift"));
            assert!(views_group.children.iter().any(|child| child.id == auth));
            assert_eq!(index.get(&auth).unwrap().path.as_deref(), Some("Auth"));
            assert_eq!(outcome.report.groups_created, 2);
            assert!(pbxproj::check(&outcome.document).is_clean());
        }

        it "adds to a multi-segment group an earlier run created" {
            let login = LogicalFile::new("LoginView.swift", "KPOPVOTE/Views/Auth", "Views/Auth/LoginView.swift");
            let register = LogicalFile::new("RegisterView.swift", "KPOPVOTE/Views/Auth", "Views/Auth/RegisterView.swift");
            let first = pbxproj::patch(APP, &[login], &EngineOptions::default());
            let second = pbxproj::patch(&first.document, &[register], &EngineOptions::default());

            let auth = pbxproj::new_group_id("KPOPVOTE/Views/Auth");
            assert_eq!(second.report.groups_created, 0);
            assert_eq!(second.report.group_children_added, 1);
            assert_eq!(count(&second.document, &format!("{auth} /* Views/Auth */ = {{")), 1);
            assert_eq!(count(&second.document, &format!("{auth} /* Views/Auth */,")), 1);

            let group = GroupIndex::scan(&second.document);
            let group = group.get(&auth).unwrap();
            assert!(group.has_child_labelled("LoginView.swift"));
            assert!(group.has_child_labelled("RegisterView.swift"));
            assert!(pbxproj::check(&second.document).is_clean());
        }

        it "adds to a nested group an earlier run created" {
            let files = vec![
                LogicalFile::new("LoginView.swift", "Views/Auth", "Views/Auth/LoginView.swift"),
                LogicalFile::new("HomeView.swift", "Views", "Views/HomeView.swift"),
            ];
            let first = pbxproj::patch(APP, &files, &EngineOptions::default());
            let second = pbxproj::patch(
                &first.document,
                &[LogicalFile::new("RegisterView.swift", "Views/Auth", "Views/Auth/RegisterView.swift")],
                &EngineOptions::default(),
            );

            assert_eq!(second.report.groups_created, 0);
            assert_eq!(second.report.group_children_added, 1);
            assert!(pbxproj::check(&second.document).is_clean());
        }

        it "adds headers to groups but not to the sources phase" {
            let file = LogicalFile::new("Bridge.h", "ViewModels", "ViewModels/Bridge.h");
            let outcome = pbxproj::patch(APP, &[file], &EngineOptions::default());

            assert_eq!(outcome.report.references_added, 1);
            assert_eq!(outcome.report.build_files_added, 0);
            assert_eq!(outcome.report.phase_entries_added, 0);
            assert!(outcome.document.contains("lastKnownFileType = sourcecode.c.h; path = Bridge.h;"));
            assert!(!outcome.document.contains("Bridge.h in Sources"));
        }

        it "honours explicit group anchors" {
            let options = EngineOptions {
                anchors: Anchors {
                    groups: [("Helpers".to_string(), id(VIEW_MODELS))].into_iter().collect(),
                    ..Anchors::default()
                },
                ..EngineOptions::default()
            };
            let file = LogicalFile::new("Format.swift", "Helpers", "ViewModels/Format.swift");
            let outcome = pbxproj::patch(APP, &[file], &options);

            assert_eq!(outcome.report.groups_created, 0);
            assert!(GroupIndex::scan(&outcome.document)
                .get(&id(VIEW_MODELS))
                .unwrap()
                .has_child_labelled("Format.swift"));
        }

        it "keeps CRLF line endings" {
            let crlf = MINIMAL.replace('\n', "\r\n");
            let outcome = pbxproj::patch(&crlf, &[bias()], &anchored_after_view_models());

            assert_eq!(outcome.document, MINIMAL_WITH_BIAS.replace('\n', "\r\n"));
        }
    }

    describe "anchor misses" {
        it "skips only the references when their section end is missing" {
            let document = MINIMAL.replace("/* End PBXFileReference section */\n", "");
            let outcome = pbxproj::patch(&document, &[bias()], &EngineOptions::default());

            assert_eq!(outcome.report.anchor_misses, vec![AnchorMiss::References]);
            assert_eq!(outcome.report.references_added, 0);
            assert_eq!(outcome.report.build_files_added, 1);
            assert_eq!(outcome.report.phase_entries_added, 1);
            assert_eq!(outcome.report.groups_created, 1);
            assert!(!outcome.document.contains("isa = PBXFileReference"));
            assert!(outcome.document.contains("isa = PBXBuildFile"));
        }

        it "skips only the build files when their section end is missing" {
            let document = MINIMAL.replace("/* End PBXBuildFile section */\n", "");
            let outcome = pbxproj::patch(&document, &[bias()], &EngineOptions::default());

            assert_eq!(outcome.report.anchor_misses, vec![AnchorMiss::BuildFiles]);
            assert_eq!(outcome.report.build_files_added, 0);
            assert_eq!(outcome.report.references_added, 1);
            assert_eq!(outcome.report.phase_entries_added, 1);
        }

        it "skips the phase listing when no sources phase exists" {
            let document = MINIMAL.replace("isa = PBXSourcesBuildPhase;", "isa = PBXResourcesBuildPhase;");
            let outcome = pbxproj::patch(&document, &[bias()], &EngineOptions::default());

            assert_eq!(outcome.report.anchor_misses, vec![AnchorMiss::SourcesPhase]);
            assert_eq!(outcome.report.phase_entries_added, 0);
            assert_eq!(outcome.report.build_files_added, 1);
            assert!(!outcome.document.contains("Bias.swift in Sources */,"));
        }

        it "does not create a group it cannot link" {
            let document = MINIMAL.replace("\t\t\tmainGroup = 4FF2C7D42EC4102800186296;\n", "");
            let outcome = pbxproj::patch(&document, &[bias()], &EngineOptions::default());

            assert_eq!(
                outcome.report.anchor_misses,
                vec![AnchorMiss::ParentGroup { group: "Models".to_string() }]
            );
            assert_eq!(outcome.report.groups_created, 0);
            assert!(!outcome.document.contains("/* Models */"));
            assert_eq!(outcome.report.references_added, 1);
        }

        it "uses a configured main group when the project omits it" {
            let document = MINIMAL.replace("\t\t\tmainGroup = 4FF2C7D42EC4102800186296;\n", "");
            let options = EngineOptions {
                anchors: Anchors {
                    main_group: Some(id(MAIN_GROUP)),
                    ..Anchors::default()
                },
                ..EngineOptions::default()
            };
            let outcome = pbxproj::patch(&document, &[bias()], &options);

            assert!(outcome.report.anchor_misses.is_empty());
            assert_eq!(outcome.report.groups_created, 1);
        }
    }

    describe "re-running" {
        it "duplicates entries with identical identifiers" {
            let once = pbxproj::patch(MINIMAL, &[bias()], &EngineOptions::default());
            let twice = pbxproj::patch(&once.document, &[bias()], &EngineOptions::default());

            let entity = pbxproj::synthesize(&bias());
            let r = entity.reference_id.as_str();
            let b = entity.build_id.as_str();
            assert_eq!(count(&twice.document, &format!("{r} /* Bias.swift */ = {{isa = PBXFileReference")), 2);
            assert_eq!(count(&twice.document, &format!("{b} /* Bias.swift in Sources */ = {{isa = PBXBuildFile")), 2);
            assert_eq!(count(&twice.document, &format!("{b} /* Bias.swift in Sources */,")), 2);

            // The second run finds the Models group and appends to it.
            assert_eq!(twice.report.groups_created, 0);
            assert_eq!(twice.report.group_children_added, 1);
            assert_eq!(count(&twice.document, "/* Models */ = {"), 1);
        }

        it "is a no-op with skip_existing" {
            let once = pbxproj::patch(MINIMAL, &[bias()], &EngineOptions::default());
            let options = EngineOptions {
                skip_existing: true,
                ..EngineOptions::default()
            };
            let twice = pbxproj::patch(&once.document, &[bias()], &options);

            assert_eq!(twice.document, once.document);
            assert!(twice.report.is_noop());
            assert_eq!(
                twice.report.skipped,
                vec![SkippedFile { name: "Bias.swift".to_string(), reason: SkipReason::AlreadyPresent }]
            );
        }

        it "adds a file listed twice only once with skip_existing" {
            let options = EngineOptions {
                skip_existing: true,
                ..EngineOptions::default()
            };
            let outcome = pbxproj::patch(MINIMAL, &[bias(), bias()], &options);

            assert_added_once(&outcome.document, &bias());
            assert_eq!(outcome.report.references_added, 1);
            assert_eq!(outcome.report.build_files_added, 1);
            assert_eq!(outcome.report.phase_entries_added, 1);
            assert_eq!(
                outcome.report.skipped,
                vec![SkippedFile { name: "Bias.swift".to_string(), reason: SkipReason::AlreadyPresent }]
            );
        }

        it "recognises files Xcode added by name" {
            let options = EngineOptions {
                skip_existing: true,
                ..EngineOptions::default()
            };
            let file = LogicalFile::new("AuthViewModel.swift", "ViewModels", "ViewModels/AuthViewModel.swift");
            let outcome = pbxproj::patch(APP, &[file], &options);

            assert_eq!(outcome.document, APP);
            assert_eq!(outcome.report.skipped.len(), 1);
        }
    }

    describe "empty input" {
        it "leaves the document untouched" {
            let outcome = pbxproj::patch(APP, &[], &EngineOptions::default());
            assert_eq!(outcome.document, APP);
            assert_eq!(outcome.report, PatchReport::default());
        }
    }
}
