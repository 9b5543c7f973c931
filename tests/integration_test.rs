//! Integration tests spanning target resolution, command-vector assembly,
//! compose post-processing, and the dummy container runtime.

use sugar::apple::dummy::{ContainerStatus, DummyRuntime};
use sugar::backend::Backend;
use sugar::compose;
use sugar::config::SugarConfig;
use sugar::resolve::{parse_scale_pairs, prepend_stack_name, resolve_services, split_options};

#[test]
fn scale_end_to_end_target_resolution() {
    // scale(stack="demo", replicas="web=3,worker=5") targets demo_web=3 and
    // demo_worker=5 in a single `service scale` invocation.
    let pairs = prepend_stack_name("demo", parse_scale_pairs("web=3,worker=5").unwrap());
    assert_eq!(pairs, vec!["demo_web=3", "demo_worker=5"]);

    let opts = split_options("--detach").unwrap();
    let args = Backend::service().command_vector(Some("scale"), &opts, &pairs, &[]);
    assert_eq!(
        args,
        vec!["service", "scale", "--detach", "demo_web=3", "demo_worker=5"]
    );
}

#[test]
fn service_names_resolve_in_order_with_stack_prefix() {
    let names = resolve_services("db, web ,stack_cache").unwrap();
    let prefixed = prepend_stack_name("stack", names);
    assert_eq!(prefixed, vec!["stack_db", "stack_web", "stack_cache"]);
}

#[test]
fn deploy_vector_pipes_compose_through_stdin_marker() {
    let backend = Backend::stack(&["deploy", "-c", "-"]);
    let args = backend.command_vector(None, &[], &["demo".to_string()], &[]);
    assert_eq!(args, vec!["stack", "deploy", "-c", "-", "demo"]);
}

#[test]
fn rendered_compose_is_ready_for_stack_deploy() {
    let rendered = r#"
name: demo
services:
  web:
    image: nginx
    ports:
      - published: "8080"
        target: "80"
  worker:
    image: worker:1
"#;
    let out = compose::postprocess(rendered).unwrap();
    assert!(!out.contains("name: demo"), "stack deploy rejects the name key");
    assert!(out.contains("published: 8080"));
    let web = out.find("web").unwrap();
    let worker = out.find("worker").unwrap();
    assert!(web < worker, "service order preserved");
}

#[test]
fn dummy_runtime_full_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut rt = DummyRuntime::new(&path);

    assert!(rt.create("c1", "img").unwrap());
    assert!(!rt.create("c1", "img").unwrap());
    assert!(!rt.start("missing").unwrap());

    assert!(rt.start("c1").unwrap());
    assert_eq!(rt.get_container("c1").unwrap().status, ContainerStatus::Running);

    assert!(rt.remove("c1").unwrap());
    assert!(rt.get_container("c1").is_none());
}

#[test]
fn config_profile_selection_feeds_compose_files() {
    let yaml = r#"
defaults:
  profile: dev
profiles:
  dev:
    config-path: containers/compose.yaml
    env-file: .env
"#;
    let config: SugarConfig = serde_yaml::from_str(yaml).unwrap();
    let (_, profile) = config.select_profile(None);
    assert_eq!(profile.config_path.files(), vec!["containers/compose.yaml"]);
    assert_eq!(profile.env_file.as_deref(), Some(".env"));
}
