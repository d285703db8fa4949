use assert_cmd::Command;
use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use serde_json::{json, Value};
use tempfile::tempdir;

#[test]
fn missing_key_bootstraps_dotenv() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("narrate")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("ELEVEN_API_KEY")
        .arg("Hello")
        .assert()
        .failure();

    let dotenv = std::fs::read_to_string(dir.path().join(".env")).unwrap();
    assert_eq!(dotenv, "ELEVEN_API_KEY=\n");

    // second run leaves the template alone
    Command::cargo_bin("narrate")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("ELEVEN_API_KEY")
        .arg("Hello")
        .assert()
        .failure();
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".env")).unwrap(),
        "ELEVEN_API_KEY=\n"
    );
}

#[test]
fn help_lists_voice_options() {
    let out = Command::cargo_bin("narrate")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("--voice-name"));
    assert!(text.contains("--output-format"));
}

#[test]
fn dotenv_supplies_options_and_credentials() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/voices").header("xi-api-key", "from-dotenv");
        then.status(200).json_body(json!({
            "voices": [
                {"voice_id": "v1", "name": "Adam"},
                {"voice_id": "v2", "name": "Eve"}
            ]
        }));
    });
    let tts = server.mock(|when, then| {
        when.method(POST).path("/v1/text-to-speech/v2");
        then.status(200).body("clip");
    });

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        format!(
            "ELEVEN_API_KEY=from-dotenv\nELEVENLABS_BASE_URL={}\nVOICEOVER_VOICE_NAME=Eve\nVOICEOVER_CACHE_DIR=clips\n",
            server.base_url()
        ),
    )
    .unwrap();

    let out = Command::cargo_bin("narrate")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("ELEVEN_API_KEY")
        .env_remove("ELEVENLABS_BASE_URL")
        .env_remove("VOICEOVER_VOICE_NAME")
        .env_remove("VOICEOVER_CACHE_DIR")
        .arg("Hello there")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    tts.assert_hits(1);
    let record: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(record["input_data"]["config"]["voice_id"], "v2");
    let audio = record["original_audio"].as_str().unwrap();
    assert_eq!(std::fs::read(dir.path().join("clips").join(audio)).unwrap(), b"clip");
}
