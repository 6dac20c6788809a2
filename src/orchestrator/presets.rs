//! Ready-made briefs for demos and smoke tests

use crate::proposal::ProjectBrief;

pub const BUDGET_RANGES: [&str; 6] = [
    "Under $10,000",
    "$10,000 - $25,000",
    "$25,000 - $50,000",
    "$50,000 - $100,000",
    "$100,000 - $250,000",
    "Over $250,000",
];

pub const EXAMPLE_NAMES: [&str; 3] = ["ecommerce", "enterprise", "mobile"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Large enterprise brief exercising every stage.
pub fn demo_project() -> ProjectBrief {
    ProjectBrief {
        client_name: Some("TechCorp Solutions".into()),
        project_title: Some("Enterprise Digital Transformation Platform".into()),
        project_description: Some(
            "Design and develop a comprehensive digital transformation platform that integrates customer \
             relationship management, inventory tracking, employee management, and advanced analytics. The \
             platform will feature a modern responsive web interface, mobile applications for iOS and Android, \
             real-time data visualization dashboards, automated reporting systems, and secure API integrations \
             with existing enterprise systems. This solution aims to streamline business operations, improve \
             decision-making through data insights, and enhance overall organizational efficiency."
                .into(),
        ),
        project_type: Some("web_app".into()),
        complexity: Some("high".into()),
        industry: Some("Technology".into()),
        client_type: Some("enterprise".into()),
        timeline_months: Some(8),
        budget_range: Some("$100,000 - $250,000".into()),
        additional_services: strings(&["seo", "maintenance"]),
        requirements: strings(&[
            "Responsive web application with modern UI/UX",
            "Mobile applications for iOS and Android",
            "Real-time analytics and reporting dashboard",
            "Customer relationship management (CRM) module",
            "Inventory management system",
            "Employee management and HR integration",
            "Secure API development and integrations",
            "Data visualization and business intelligence",
            "Multi-role user authentication and authorization",
            "Automated email notifications and alerts",
            "Cloud deployment with scalable infrastructure",
            "Comprehensive testing and quality assurance",
        ]),
        target_technologies: strings(&[
            "React.js",
            "TypeScript",
            "Node.js",
            "Express.js",
            "PostgreSQL",
            "Redis",
            "Docker",
            "AWS",
            "React Native",
            "GraphQL",
            "JWT Authentication",
            "Chart.js",
            "Material-UI",
            "Jest",
            "Cypress",
        ]),
        is_recurring_client: true,
        projects_completed_before: 2,
        ..Default::default()
    }
}

/// Named example brief, if one exists.
pub fn example_project(name: &str) -> Option<ProjectBrief> {
    let brief = match name {
        "ecommerce" => ProjectBrief {
            client_name: Some("TechStart Solutions".into()),
            project_title: Some("E-commerce Platform Development".into()),
            project_description: Some(
                "Build a modern e-commerce platform with product catalog, shopping cart, payment integration, \
                 and admin dashboard. Requires mobile-responsive design and SEO optimization."
                    .into(),
            ),
            project_type: Some("ecommerce".into()),
            complexity: Some("medium".into()),
            industry: Some("Retail".into()),
            client_type: Some("startup".into()),
            timeline_months: Some(4),
            budget_range: Some("$25,000 - $50,000".into()),
            additional_services: strings(&["seo"]),
            requirements: strings(&[
                "Product catalog management",
                "Shopping cart and checkout",
                "Payment gateway integration",
                "User authentication and profiles",
                "Admin dashboard",
                "Mobile responsive design",
                "SEO optimization",
            ]),
            target_technologies: strings(&["React", "Node.js", "MongoDB", "Stripe API"]),
            ..Default::default()
        },
        "enterprise" => ProjectBrief {
            client_name: Some("Global Manufacturing Corp".into()),
            project_title: Some("Enterprise Resource Planning System".into()),
            project_description: Some(
                "Comprehensive ERP system for manufacturing operations including inventory management, supply \
                 chain tracking, financial reporting, and workforce management."
                    .into(),
            ),
            project_type: Some("web_app".into()),
            complexity: Some("high".into()),
            industry: Some("Manufacturing".into()),
            client_type: Some("enterprise".into()),
            timeline_months: Some(12),
            budget_range: Some("$100,000 - $250,000".into()),
            requirements: strings(&[
                "Inventory management system",
                "Supply chain tracking",
                "Financial reporting module",
                "Workforce management",
                "Real-time analytics dashboard",
                "Multi-location support",
                "Integration with existing systems",
            ]),
            target_technologies: strings(&["Java", "Spring Boot", "PostgreSQL", "Angular", "Microservices"]),
            ..Default::default()
        },
        "mobile" => ProjectBrief {
            client_name: Some("FitLife Wellness".into()),
            project_title: Some("Fitness Tracking Mobile Application".into()),
            project_description: Some(
                "Cross-platform mobile app for fitness tracking with workout plans, nutrition logging, progress \
                 analytics, and social features for community engagement."
                    .into(),
            ),
            project_type: Some("mobile_app".into()),
            complexity: Some("medium".into()),
            industry: Some("Health & Fitness".into()),
            client_type: Some("small_business".into()),
            timeline_months: Some(6),
            budget_range: Some("$40,000 - $80,000".into()),
            requirements: strings(&[
                "Cross-platform mobile app",
                "Workout tracking and plans",
                "Nutrition logging",
                "Progress analytics",
                "Social features",
                "Wearable device integration",
                "Offline functionality",
            ]),
            target_technologies: strings(&["React Native", "Firebase", "TensorFlow Lite", "GraphQL"]),
            ..Default::default()
        },
        _ => return None,
    };
    Some(brief)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_named_example_exists_and_validates() {
        for name in EXAMPLE_NAMES {
            let brief = example_project(name).unwrap();
            assert!(brief.validate().is_ok(), "{} should pass intake", name);
        }
        assert!(example_project("healthcare").is_none());
    }

    #[test]
    fn test_demo_project_is_recurring_enterprise() {
        let demo = demo_project();
        assert!(demo.validate().is_ok());
        assert!(demo.is_recurring_client);
        assert_eq!(demo.timeline_months, Some(8));
        assert_eq!(demo.timeline_weeks_or_default(), 4);
    }
}
