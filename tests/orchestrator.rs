mod common;

use common::{Events, FakeTerraform};
use provisioner::{AwsProvisioner, ProvisionError, Provisioner};

#[tokio::test]
async fn test_provision_runs_init_then_apply() {
    let events = Events::default();
    let tf = FakeTerraform::new(events.clone());

    AwsProvisioner.provision(&tf).await.unwrap();

    assert_eq!(events.all(), vec!["init", "apply"]);
}

#[tokio::test]
async fn test_deprovision_runs_init_then_destroy() {
    let events = Events::default();
    let tf = FakeTerraform::new(events.clone());

    AwsProvisioner.deprovision(&tf).await.unwrap();

    assert_eq!(events.all(), vec!["init", "destroy"]);
}

#[tokio::test]
async fn test_provision_init_failure_short_circuits() {
    let events = Events::default();
    let tf = FakeTerraform::failing(events.clone(), "init", "Error: Backend initialization required");

    let err = AwsProvisioner.provision(&tf).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Init(_)));
    assert!(err.to_string().starts_with("failed to initialize Terraform: "));
    assert_eq!(events.all(), vec!["init"]);
}

#[tokio::test]
async fn test_deprovision_init_failure_short_circuits() {
    let events = Events::default();
    let tf = FakeTerraform::failing(events.clone(), "init", "");

    let err = AwsProvisioner.deprovision(&tf).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Init(_)));
    assert!(!events.contains("destroy"));
}

#[tokio::test]
async fn test_apply_failure_identifies_stage() {
    let events = Events::default();
    let tf = FakeTerraform::failing(events.clone(), "apply", "Error: creating EC2 VPC");

    let err = AwsProvisioner.provision(&tf).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Apply(_)));
    assert!(
        err.to_string()
            .contains("failed to apply Terraform configuration")
    );
    assert!(err.to_string().contains("creating EC2 VPC"));
    assert!(!events.contains("destroy"));
    assert_eq!(events.count("apply"), 1);
}

#[tokio::test]
async fn test_destroy_failure_identifies_stage() {
    let events = Events::default();
    let tf = FakeTerraform::failing(events.clone(), "destroy", "Error: No state found");

    let err = AwsProvisioner.deprovision(&tf).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Destroy(_)));
    assert!(
        err.to_string()
            .contains("failed to destroy Terraform resources")
    );
    assert_eq!(events.all(), vec!["init", "destroy"]);
}
