// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Input text sanitization.
//!
//! Free-text fields (names, addresses, review comments) are HTML-escaped at
//! the request boundary so stored state never carries markup.

/// Escapes HTML-significant characters in user-supplied text.
pub fn clean(input: &str) -> String {
    html_escape::encode_safe(input).into_owned()
}

/// Escapes an optional field, passing `None` through.
pub fn clean_opt(input: Option<String>) -> Option<String> {
    input.map(|s| clean(&s))
}
