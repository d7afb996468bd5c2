/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

/// normalize a callsign as reported by tracking providers, which pad callsigns with blanks
/// (e.g. "KLM1023 " or " KLM 1023"). All callsign comparisons have to use the normalized form
pub fn normalize_callsign (raw: &str)->String {
    raw.chars().filter( |c| !c.is_whitespace()).collect()
}

/// check without allocation if a raw callsign is the same as an already normalized one
pub fn is_same_callsign (raw: &str, normalized: &str)->bool {
    let mut it = raw.chars().filter( |c| !c.is_whitespace());
    let mut it_norm = normalized.chars();
    loop {
        match (it.next(), it_norm.next()) {
            (Some(a), Some(b)) => if a != b { return false }
            (None, None) => return true,
            _ => return false
        }
    }
}
