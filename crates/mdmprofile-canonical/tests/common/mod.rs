#![allow(dead_code)]

pub const HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    "\n",
    r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#,
    "\n",
);

/// A Wi-Fi payload as an authoring tool would write it: space indentation,
/// keys in no particular order.
pub fn wifi_payload(uuid: &str, ssid: &str) -> String {
    format!(
        r#"        <dict>
            <key>PayloadDisplayName</key>
            <string>Wi-Fi</string>
            <key>PayloadType</key>
            <string>com.apple.wifi.managed</string>
            <key>PayloadUUID</key>
            <string>{uuid}</string>
            <key>PayloadIdentifier</key>
            <string>com.example.wifi.{uuid}</string>
            <key>PayloadOrganization</key><string>Example</string>
            <key>PayloadEnabled</key><true/>
            <key>SSID_STR</key>
            <string>{ssid}</string>
            <key>PayloadVersion</key>
            <integer>1</integer>
            <key>AutoJoin</key><true/>
        </dict>
"#
    )
}

pub fn profile_with_payloads(payloads: &[String], scope: &str) -> String {
    format!(
        r#"{header}<plist version="1.0">
<dict>
    <key>PayloadContent</key>
    <array>
{items}    </array>
    <key>PayloadDisplayName</key>
    <string>Corporate Wi-Fi</string>
    <key>PayloadIdentifier</key>
    <string>com.example.profile</string>
    <key>PayloadScope</key>
    <string>{scope}</string>
    <key>PayloadType</key>
    <string>Configuration</string>
    <key>PayloadUUID</key>
    <string>0F6C1C1E-0000-4000-8000-000000000001</string>
    <key>PayloadVersion</key>
    <integer>1</integer>
    <key>PayloadRemovalDisallowed</key>
    <false/>
</dict>
</plist>
"#,
        header = HEADER,
        items = payloads.concat(),
    )
}

pub fn wifi_profile(scope: &str) -> String {
    profile_with_payloads(&[wifi_payload("5A1B", "corp")], scope)
}

pub const EXTRACTED_WIFI: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    "\n",
    r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#,
    "\n",
    "<plist version=\"1.0\">\n",
    "<dict>\n",
    "\t<key>AutoJoin</key>\n",
    "\t<true/>\n",
    "\t<key>PayloadType</key>\n",
    "\t<string>com.apple.wifi.managed</string>\n",
    "\t<key>PayloadVersion</key>\n",
    "\t<integer>1</integer>\n",
    "\t<key>SSID_STR</key>\n",
    "\t<string>corp</string>\n",
    "</dict>\n",
    "</plist>\n",
);
