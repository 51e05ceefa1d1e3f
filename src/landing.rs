//! Informational sections of the landing page, paged one at a time.

/// Sections shown on the About screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    HowItWorks,
    PriceTips,
    WhyUs,
    Coverage,
    Payment,
    Documents,
    Reviews,
    Faq,
}

impl Section {
    const ORDER: [Section; 8] = [
        Section::HowItWorks,
        Section::PriceTips,
        Section::WhyUs,
        Section::Coverage,
        Section::Payment,
        Section::Documents,
        Section::Reviews,
        Section::Faq,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::HowItWorks => "How it works",
            Section::PriceTips => "How to get a better price",
            Section::WhyUs => "Why people choose us",
            Section::Coverage => "Service area",
            Section::Payment => "Payment methods",
            Section::Documents => "Guarantees and documents",
            Section::Reviews => "Customer reviews",
            Section::Faq => "Frequently asked questions",
        }
    }
}

/// Pager state for the About screen.
#[derive(Clone, Debug)]
pub struct LandingState {
    /// Index into the section order.
    pub current: usize,
}

impl LandingState {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    pub fn section(&self) -> Section {
        Section::ORDER[self.current]
    }

    pub fn total(&self) -> usize {
        Section::ORDER.len()
    }

    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.current + 1
    }

    /// Advance, wrapping to the first section.
    pub fn next(&mut self) {
        self.current = (self.current + 1) % Section::ORDER.len();
    }

    /// Go back, wrapping to the last section.
    pub fn prev(&mut self) {
        self.current = (self.current + Section::ORDER.len() - 1) % Section::ORDER.len();
    }

    /// Body text of the current section.
    pub fn body(&self, cities: &[String]) -> String {
        section_body(self.section(), cities)
    }
}

impl Default for LandingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Body text of a section. Coverage lists the configured cities.
pub fn section_body(section: Section, cities: &[String]) -> String {
    match section {
        Section::HowItWorks => [
            "1. Online request: fill in a short form with make, year, mileage and contact.",
            "2. Estimate: we quote a price right away and refine it by photos and VIN (optional).",
            "3. Inspection: an expert comes within an hour; the inspection takes 15-20 minutes.",
            "4. Deal and payment: we sign the contract and pay the way you prefer.",
        ]
        .join("\n\n"),
        Section::PriceTips => [
            "- Enter the real VIN so we can check the service history.",
            "- Add photos of the service book and the last maintenance receipt.",
            "- Describe the trim (packages, options, a second set of tires).",
        ]
        .join("\n"),
        Section::WhyUs => [
            "Fair price without haggling: the estimate holds after inspection unless there are hidden defects.",
            "Legal clarity: contract, transfer act and instant payment. We pay off loans and lift encumbrances.",
            "Comfort and speed: the expert comes to you and everything is signed on site, about an hour in total.",
        ]
        .join("\n\n"),
        Section::Coverage => {
            let mut lines: Vec<String> =
                cities.iter().map(|c| format!("{c:<24} ~ 60-90 min")).collect();
            lines.push(String::new());
            lines.push("Your city is missing? Write to us and we will try to help.".into());
            lines.join("\n")
        }
        Section::Payment => [
            "Instant transfer | Fast payment system | Cash | Corporate account",
            "",
            "We work officially: sale contract and transfer act.",
        ]
        .join("\n"),
        Section::Documents => [
            "Guarantees:",
            "- The offer is fixed in a booking contract.",
            "- Database checks of the car are free.",
            "- Payment before re-registration or at the same time, as agreed.",
            "",
            "What to prepare:",
            "- Vehicle passport (paper or electronic), registration certificate, owner's passport.",
            "- Keys (two sets if possible), service book.",
            "- Power of attorney or spouse consent, when needed.",
        ]
        .join("\n"),
        Section::Reviews => [
            "Andrey K. (5): Sold my Tiguan in an hour; the estimate matched the final price.",
            "Marina P. (5): After an accident I expected trouble. They came, explained everything and paid at once.",
            "Ilya R. (4.8): We met at my service station, checked the car and signed. Quick and easy.",
        ]
        .join("\n\n"),
        Section::Faq => [
            "Q: Will you take a car after an accident?\nA: Yes, in any condition: damaged, not running, with faults.",
            "Q: How is the price formed?\nA: Year, mileage, condition, model liquidity, market data and the inspection.",
            "Q: Do I need the vehicle passport?\nA: The original is preferred. If it is lost we will help restore it.",
            "Q: How fast do I get the money?\nA: Usually within an hour after inspection: bank transfer or cash.",
            "Q: What if the car is under a loan?\nA: We pay off the balance, lift the encumbrance and close the deal legally.",
            "Q: Can I sell by power of attorney?\nA: Yes, with a notarized power of attorney and the agent's passport.",
        ]
        .join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_wraps_both_ways() {
        let mut state = LandingState::new();
        state.prev();
        assert_eq!(state.section(), Section::Faq);
        assert_eq!(state.page_number(), state.total());
        state.next();
        assert_eq!(state.section(), Section::HowItWorks);
    }

    #[test]
    fn test_coverage_lists_cities() {
        let mut state = LandingState::new();
        while state.section() != Section::Coverage {
            state.next();
        }
        let body = state.body(&["Tver".to_string(), "Khimki".to_string()]);
        assert!(body.contains("Tver"));
        assert!(body.contains("Khimki"));
    }
}
