use mdmprofile_canonical::{extract_payloads, parse_profile, Canonicalizer};

const PROFILE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
  <key>PayloadType</key><string>Configuration</string>
  <key>PayloadScope</key><string>System</string>
  <key>PayloadContent</key>
  <array>
    <dict>
      <key>PayloadUUID</key><string>7D1E</string>
      <key>PayloadType</key><string>com.apple.dock</string>
      <key>autohide</key><true/>
    </dict>
  </array>
</dict>
</plist>"#;

fn main() {
    match Canonicalizer::new().canonicalize_bytes(PROFILE.as_bytes()) {
        Ok(result) => {
            println!("{}", String::from_utf8_lossy(&result.bytes));
        }
        Err(err) => {
            eprintln!("canonicalization failed: {}", err);
            std::process::exit(1);
        }
    }

    let payloads = parse_profile(PROFILE.as_bytes())
        .map_err(|err| err.to_string())
        .and_then(|profile| extract_payloads(&profile).map_err(|err| err.to_string()));
    match payloads {
        Ok(payloads) => {
            for payload in payloads {
                println!("{}", payload);
            }
        }
        Err(err) => {
            eprintln!("extraction failed: {}", err);
            std::process::exit(1);
        }
    }
}
