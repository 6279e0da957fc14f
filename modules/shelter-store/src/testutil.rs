//! Test utilities for spinning up a real MongoDB instance via testcontainers.

use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use shelter_common::Config;

pub const TEST_USER: &str = "aacuser";
pub const TEST_PASSWORD: &str = "test";

/// Spin up a MongoDB container and return the container handle + a Config
/// pointing at it.
///
/// The container is dropped (and stopped) when `ContainerAsync` goes out of scope,
/// so callers must hold it alive for the duration of the test.
pub async fn mongo_container() -> (ContainerAsync<GenericImage>, Config) {
    let image = GenericImage::new("mongo", "7.0")
        .with_exposed_port(ContainerPort::Tcp(27017))
        .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
        .with_env_var("MONGO_INITDB_ROOT_USERNAME", TEST_USER)
        .with_env_var("MONGO_INITDB_ROOT_PASSWORD", TEST_PASSWORD);

    let container: ContainerAsync<GenericImage> = image
        .start()
        .await
        .expect("Failed to start MongoDB container");

    let host_port = container
        .get_host_port_ipv4(27017)
        .await
        .expect("Failed to get MongoDB host port");

    let config = Config::from_lookup(|key| match key {
        "MONGO_HOST" => Some("127.0.0.1".to_string()),
        "MONGO_PORT" => Some(host_port.to_string()),
        "MONGO_DATABASE" => Some("AAC".to_string()),
        "MONGO_COLLECTION" => Some("animals".to_string()),
        _ => None,
    })
    .expect("test config")
    .with_credentials(TEST_USER, TEST_PASSWORD);

    (container, config)
}
